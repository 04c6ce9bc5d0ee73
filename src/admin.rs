//! Admin dashboard pages: one entity list plus its create/edit form.
//!
//! Every failure is turned into a [`Notice`] here, so callers render
//! `notice()` instead of handling errors themselves.

use log::{info, warn};

use crate::error::Error;
use crate::resource::{DataSource, FormMode, Resource, ResourceClient, Toggleable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Message shown above an admin form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// The one place errors become user-facing text
    pub fn from_error(error: &Error) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: error.user_message(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// State of one admin page
pub struct AdminPanel<T> {
    client: ResourceClient<T>,
    items: Vec<T>,
    form: FormMode<T>,
    notice: Option<Notice>,
    source: Option<DataSource>,
}

impl<T: Resource + Default> AdminPanel<T> {
    pub fn new(client: ResourceClient<T>) -> Self {
        Self {
            client,
            items: Vec::new(),
            form: FormMode::New(T::default()),
            notice: None,
            source: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn form(&self) -> &FormMode<T> {
        &self.form
    }

    /// The record being typed into
    pub fn draft_mut(&mut self) -> &mut T {
        self.form.value_mut()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Where the current list came from, once loaded
    pub fn source(&self) -> Option<DataSource> {
        self.source
    }

    pub fn client(&self) -> &ResourceClient<T> {
        &self.client
    }

    fn fail(&mut self, action: &str, error: Error) {
        warn!("{} failed for {}: {}", action, T::PATH, error);
        self.notice = Some(Notice::from_error(&error));
    }

    /// Fetch the list. On failure the previous list is kept.
    pub async fn load(&mut self) -> bool {
        match self.client.fetch_list().await {
            Ok(fetched) => {
                self.items = fetched.items;
                self.source = Some(fetched.source);
                true
            }
            Err(e) => {
                self.fail("load", e);
                false
            }
        }
    }

    /// Put an existing record into the form
    pub fn edit(&mut self, id: &str) -> bool {
        match self.items.iter().find(|item| item.id() == id) {
            Some(item) => {
                self.form = FormMode::edit(item);
                true
            }
            None => false,
        }
    }

    /// Empty the form back to a new record
    pub fn reset_form(&mut self) {
        self.form = FormMode::New(T::default());
    }

    /// Create or update from the form.
    ///
    /// On success the stored record replaces or joins the list and the form
    /// is cleared. On failure the form keeps its values for a retry.
    pub async fn submit(&mut self) -> Option<T> {
        let editing = self.form.is_editing();
        match self.client.save(&self.form).await {
            Ok(saved) => {
                self.upsert(saved.clone());
                self.reset_form();
                let verb = if editing { "updated" } else { "created" };
                info!("{} {} {}", T::PATH, saved.id(), verb);
                self.notice = Some(Notice::success(format!("Saved successfully ({}).", verb)));
                Some(saved)
            }
            Err(e) => {
                self.fail("save", e);
                None
            }
        }
    }

    /// Delete after `confirm` agrees. Declining sends nothing.
    pub async fn delete(&mut self, id: &str, confirm: impl FnOnce(&T) -> bool) -> bool {
        let Some(item) = self.items.iter().find(|item| item.id() == id) else {
            return false;
        };
        if !confirm(item) {
            return false;
        }

        match self.client.delete(id).await {
            Ok(()) => {
                self.items.retain(|item| item.id() != id);
                if matches!(&self.form, FormMode::Editing { id: editing, .. } if editing == id) {
                    self.reset_form();
                }
                self.notice = Some(Notice::success("Deleted."));
                true
            }
            Err(e) => {
                self.fail("delete", e);
                false
            }
        }
    }

    /// Replace the record with the same id, or append it
    pub fn upsert(&mut self, record: T) {
        match self.items.iter_mut().find(|item| item.id() == record.id()) {
            Some(existing) => *existing = record,
            None => self.items.push(record),
        }
    }
}

impl<T: Toggleable + Default> AdminPanel<T> {
    /// Flip a record's active flag and merge the server's copy
    pub async fn toggle(&mut self, id: &str) -> Option<T> {
        let item = self.items.iter().find(|item| item.id() == id)?.clone();
        match self.client.toggle(&item).await {
            Ok(updated) => {
                self.upsert(updated.clone());
                Some(updated)
            }
            Err(e) => {
                self.fail("toggle", e);
                None
            }
        }
    }
}
