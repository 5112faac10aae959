use reldb_common::CellValue;

use crate::error::TableError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerScope {
    Row,
    Statement,
}

/// `old_data` is populated for UPDATE/DELETE; `new_data` for INSERT/UPDATE
/// and only mutable on `BEFORE` row triggers (spec.md §4.5 "Triggers").
/// Statement-level triggers see `(None, None)`.
pub type TriggerAction = Box<dyn Fn(Option<&[CellValue]>, Option<&mut Vec<CellValue>>) -> Result<(), TableError> + Send + Sync>;

pub struct TriggerDef {
    pub name: String,
    pub scope: TriggerScope,
    action: TriggerAction,
}

impl TriggerDef {
    pub fn new(name: impl Into<String>, scope: TriggerScope, action: TriggerAction) -> Self {
        Self {
            name: name.into(),
            scope,
            action,
        }
    }
}

impl std::fmt::Debug for TriggerDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerDef")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Per-(timing × event) ordered lists, six in total (spec.md §4.5).
#[derive(Default)]
pub struct TriggerList {
    before_insert: Vec<TriggerDef>,
    after_insert: Vec<TriggerDef>,
    before_update: Vec<TriggerDef>,
    after_update: Vec<TriggerDef>,
    before_delete: Vec<TriggerDef>,
    after_delete: Vec<TriggerDef>,
}

impl TriggerList {
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, timing: TriggerTiming, event: TriggerEvent) -> &mut Vec<TriggerDef> {
        match (timing, event) {
            (TriggerTiming::Before, TriggerEvent::Insert) => &mut self.before_insert,
            (TriggerTiming::After, TriggerEvent::Insert) => &mut self.after_insert,
            (TriggerTiming::Before, TriggerEvent::Update) => &mut self.before_update,
            (TriggerTiming::After, TriggerEvent::Update) => &mut self.after_update,
            (TriggerTiming::Before, TriggerEvent::Delete) => &mut self.before_delete,
            (TriggerTiming::After, TriggerEvent::Delete) => &mut self.after_delete,
        }
    }

    fn list(&self, timing: TriggerTiming, event: TriggerEvent) -> &[TriggerDef] {
        match (timing, event) {
            (TriggerTiming::Before, TriggerEvent::Insert) => &self.before_insert,
            (TriggerTiming::After, TriggerEvent::Insert) => &self.after_insert,
            (TriggerTiming::Before, TriggerEvent::Update) => &self.before_update,
            (TriggerTiming::After, TriggerEvent::Update) => &self.after_update,
            (TriggerTiming::Before, TriggerEvent::Delete) => &self.before_delete,
            (TriggerTiming::After, TriggerEvent::Delete) => &self.after_delete,
        }
    }

    pub fn register(&mut self, timing: TriggerTiming, event: TriggerEvent, def: TriggerDef) {
        self.list_mut(timing, event).push(def);
    }

    /// Fire every row-scoped `BEFORE` trigger for `event`, letting each
    /// mutate `new_data` in turn.
    pub fn fire_before_row(&self, event: TriggerEvent, old_data: Option<&[CellValue]>, new_data: &mut Vec<CellValue>) -> Result<(), TableError> {
        for def in self.list(TriggerTiming::Before, event) {
            if def.scope != TriggerScope::Row {
                continue;
            }
            (def.action)(old_data, Some(new_data)).map_err(|e| retag(def, e))?;
        }
        Ok(())
    }

    /// Fire every row-scoped `AFTER` trigger for `event`. Each receives a
    /// read-only snapshot so no later trigger's mutation is observable.
    pub fn fire_after_row(&self, event: TriggerEvent, old_data: Option<&[CellValue]>, new_data: Option<&[CellValue]>) -> Result<(), TableError> {
        for def in self.list(TriggerTiming::After, event) {
            if def.scope != TriggerScope::Row {
                continue;
            }
            let mut snapshot = new_data.map(|d| d.to_vec());
            (def.action)(old_data, snapshot.as_mut()).map_err(|e| retag(def, e))?;
        }
        Ok(())
    }

    /// Fire every statement-scoped trigger for `(timing, event)` exactly
    /// once, with `(None, None)`.
    pub fn fire_statement(&self, timing: TriggerTiming, event: TriggerEvent) -> Result<(), TableError> {
        for def in self.list(timing, event) {
            if def.scope != TriggerScope::Statement {
                continue;
            }
            (def.action)(None, None).map_err(|e| retag(def, e))?;
        }
        Ok(())
    }
}

fn retag(def: &TriggerDef, err: TableError) -> TableError {
    match err {
        TableError::TriggerFailed { .. } => err,
        other => TableError::TriggerFailed {
            name: def.name.clone(),
            reason: other.to_string(),
        },
    }
}
