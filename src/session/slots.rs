//! Argument slots and refvar co-reference

use super::CurationSession;
use crate::error::{CurationError, CurationResult};
use crate::integrity;
use crate::model::{Arg, SlotTemplates, StagedArg};
use crate::selector::{Lookup, SelectorKind};
use serde::{Deserialize, Serialize};

/// New values for an existing slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEdit {
    pub role: String,
    pub refvar: String,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl SlotEdit {
    pub fn new(role: impl Into<String>, refvar: impl Into<String>, constraints: Vec<String>) -> Self {
        Self {
            role: role.into(),
            refvar: refvar.into(),
            constraints,
        }
    }
}

impl CurationSession {
    /// Pick the role an event will receive on the next [`add_arg`](Self::add_arg)
    pub fn stage_arg(&mut self, event_text: &str, role: &str, templates: &SlotTemplates) -> CurationResult<()> {
        let constraints = templates
            .constraints_for(role)
            .ok_or_else(|| CurationError::UnknownRole {
                event: event_text.to_string(),
                role: role.to_string(),
            })?
            .to_vec();
        self.event_mut(event_text)?.staged = Some(StagedArg {
            role: role.to_string(),
            constraints,
        });
        Ok(())
    }

    /// Constraints allowed by the staged role of every checked event.
    ///
    /// Order follows the first checked event; an unstaged checked event
    /// contributes nothing, so the result is empty.
    pub fn common_constraints(&self) -> Vec<String> {
        let mut checked = self.checked_events();
        let Some(first) = checked.next() else {
            return Vec::new();
        };
        let mut common = first.staged.as_ref().map(|s| s.constraints.clone()).unwrap_or_default();
        for event in checked {
            let allowed = event.staged.as_ref().map(|s| s.constraints.as_slice()).unwrap_or_default();
            common.retain(|c| allowed.contains(c));
        }
        common
    }

    /// Bind `refvar` to the staged role of every checked event.
    ///
    /// All checked events must have a staged role; nothing is added otherwise.
    pub fn add_arg(&mut self, refvar: &str, constraints: Vec<String>) -> CurationResult<Vec<Lookup>> {
        let refvar = refvar.trim();
        if refvar.is_empty() {
            return Err(CurationError::EmptyRefvar);
        }
        if self.checked_events().next().is_none() {
            return Err(CurationError::NoEventSelected);
        }
        if let Some(unstaged) = self.checked_events().find(|e| e.staged.is_none()) {
            return Err(CurationError::RoleNotStaged(unstaged.event_text.clone()));
        }

        let mut bound = 0usize;
        for event in self.events.iter_mut().filter(|e| e.is_checked) {
            if let Some(staged) = event.staged.as_ref() {
                event.args.push(Arg::new(staged.role.clone(), refvar, constraints.clone()));
                bound += 1;
            }
        }
        tracing::debug!(refvar = %refvar, events = bound, "added arg");

        Ok(self
            .selectors
            .lookup_for(SelectorKind::Refvar, refvar)
            .into_iter()
            .collect())
    }

    /// Overwrite every arg of `event_text` matching `old_role` and
    /// `old_refvar`, then reconcile the refvar caches
    pub fn save_slot(
        &mut self,
        event_text: &str,
        old_role: &str,
        old_refvar: Option<&str>,
        edit: SlotEdit,
    ) -> CurationResult<Vec<Lookup>> {
        let refvar = edit.refvar.trim();
        if refvar.is_empty() {
            return Err(CurationError::EmptyRefvar);
        }
        let event = self.event_mut(event_text)?;
        let mut matched = false;
        for arg in event
            .args
            .iter_mut()
            .filter(|a| a.role == old_role && a.refvar.as_deref() == old_refvar)
        {
            arg.role = edit.role.clone();
            arg.refvar = Some(refvar.to_string());
            arg.constraints = edit.constraints.clone();
            matched = true;
        }
        if !matched {
            return Err(CurationError::SlotNotFound {
                event: event_text.to_string(),
                role: old_role.to_string(),
            });
        }

        let lookup = match old_refvar {
            Some(old) => self.on_refvar_edited(Some(refvar), old),
            None => self.selectors.lookup_for(SelectorKind::Refvar, refvar),
        };
        Ok(lookup.into_iter().collect())
    }

    /// Remove the args of `event_text` matching `role` and `refvar`
    pub fn delete_slot(&mut self, event_text: &str, role: &str, refvar: Option<&str>) -> CurationResult<()> {
        let event = self.event_mut(event_text)?;
        let before = event.args.len();
        event
            .args
            .retain(|a| a.role != role || a.refvar.as_deref() != refvar);
        if event.args.len() == before {
            return Err(CurationError::SlotNotFound {
                event: event_text.to_string(),
                role: role.to_string(),
            });
        }
        if let Some(old) = refvar {
            self.on_refvar_edited(None, old);
        }
        Ok(())
    }

    /// Reconcile the refvar cache after a slot changed from `old_refvar`.
    ///
    /// Returns the lookup for `new_refvar` when it is not cached. The selector
    /// of `old_refvar` goes away once no arg of any event binds it.
    pub fn on_refvar_edited(&mut self, new_refvar: Option<&str>, old_refvar: &str) -> Option<Lookup> {
        let lookup = new_refvar.and_then(|r| self.selectors.lookup_for(SelectorKind::Refvar, r));
        if !integrity::refvar_in_use(&self.events, old_refvar) && self.selectors.refvars.remove(old_refvar).is_some() {
            tracing::debug!(refvar = %old_refvar, "removed unused refvar selector");
        }
        lookup
    }
}
