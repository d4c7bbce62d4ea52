use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::api::UserApi;
use crate::error::PortalError;
use crate::models::{CreateUserRequest, ManagerDto};

/// Confirmation seam for destructive actions. The UI shell supplies the
/// real dialog; deletion is never issued when this declines.
pub trait ConfirmDelete: Send + Sync {
    fn confirm(&self, user_id: i64) -> bool;
}

/// Stand-in for contexts with no human attached.
pub struct AlwaysConfirm;

impl ConfirmDelete for AlwaysConfirm {
    fn confirm(&self, _user_id: i64) -> bool {
        true
    }
}

/// Input buffer for a user-creation form.
#[derive(Debug, Default)]
pub struct UserDraft {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserDraft {
    fn to_create_request(&self, role_name: &str, manager_id: Option<i64>) -> CreateUserRequest {
        CreateUserRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role_name: role_name.to_string(),
            manager_id,
        }
    }
}

/// Per-manager employee-creation sub-form. Messages are keyed by manager
/// so concurrent failures on different managers never overwrite one
/// another.
#[derive(Debug, Default)]
pub struct EmployeeForm {
    pub open: bool,
    pub draft: UserDraft,
    pub message: Option<String>,
}

/// Drives the manager roster and the nested per-manager employee forms.
/// The server owns the nested employee list shape, so every successful
/// mutation triggers a full reload instead of patching the roster
/// locally.
pub struct UserHierarchyManager {
    users: Arc<dyn UserApi>,
    confirm: Arc<dyn ConfirmDelete>,
    managers: Vec<ManagerDto>,
    loading: bool,
    manager_draft: UserDraft,
    manager_message: Option<String>,
    employee_forms: HashMap<i64, EmployeeForm>,
    alert: Option<String>,
}

impl UserHierarchyManager {
    pub fn new(users: Arc<dyn UserApi>, confirm: Arc<dyn ConfirmDelete>) -> Self {
        Self {
            users,
            confirm,
            managers: Vec::new(),
            loading: false,
            manager_draft: UserDraft::default(),
            manager_message: None,
            employee_forms: HashMap::new(),
            alert: None,
        }
    }

    pub fn managers(&self) -> &[ManagerDto] {
        &self.managers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn manager_draft(&self) -> &UserDraft {
        &self.manager_draft
    }

    pub fn manager_message(&self) -> Option<&str> {
        self.manager_message.as_deref()
    }

    pub fn employee_form(&self, manager_id: i64) -> Option<&EmployeeForm> {
        self.employee_forms.get(&manager_id)
    }

    /// Takes the pending blocking alert, if any. Reading it counts as the
    /// acknowledgment.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Fetches the roster. On failure the previous roster stays on
    /// display; nothing was mutated, so there is nothing to roll back.
    pub async fn load_managers(&mut self) -> Result<(), PortalError> {
        self.loading = true;
        let result = self.users.list_managers().await;
        self.loading = false;

        match result {
            Ok(list) => {
                self.managers = list;
                Ok(())
            }
            Err(err) => {
                error!("failed to load managers: {}", err);
                Err(err)
            }
        }
    }

    pub async fn create_manager(&mut self, draft: UserDraft) -> Result<(), PortalError> {
        self.manager_draft = draft;

        if self.manager_draft.username.trim().is_empty() || self.manager_draft.password.is_empty() {
            let msg = "Username and password are required";
            self.manager_message = Some(msg.to_string());
            return Err(PortalError::Validation(msg.to_string()));
        }

        let request = self.manager_draft.to_create_request("Manager", None);
        match self.users.create_user(request).await {
            Ok(user) => {
                info!("manager {} created", user.user_id);
                self.manager_message = Some("Manager created".to_string());
                self.manager_draft = UserDraft::default();
                let _ = self.load_managers().await;
                Ok(())
            }
            Err(err) => {
                self.manager_message = Some(format!("Create failed: {}", err));
                Err(err)
            }
        }
    }

    /// Lazily initializes the employee sub-form for the manager on first
    /// use, then flips its visibility.
    pub fn toggle_create_for(&mut self, manager_id: i64) {
        let form = self.employee_forms.entry(manager_id).or_default();
        form.open = !form.open;
    }

    pub fn cancel_create(&mut self, manager_id: i64) {
        if let Some(form) = self.employee_forms.get_mut(&manager_id) {
            form.open = false;
        }
    }

    pub async fn create_employee(
        &mut self,
        manager_id: i64,
        draft: UserDraft,
    ) -> Result<(), PortalError> {
        let form = self.employee_forms.entry(manager_id).or_default();
        form.draft = draft;

        if form.draft.username.trim().is_empty() || form.draft.password.is_empty() {
            let msg = "Username and password are required";
            form.message = Some(msg.to_string());
            return Err(PortalError::Validation(msg.to_string()));
        }

        let request = form.draft.to_create_request("Employee", Some(manager_id));
        match self.users.create_user(request).await {
            Ok(user) => {
                info!("employee {} created under manager {}", user.user_id, manager_id);
                let form = self.employee_forms.entry(manager_id).or_default();
                form.draft = UserDraft::default();
                form.message = Some("Employee created".to_string());
                // reload to pick up the server's nested employee list
                let _ = self.load_managers().await;
                Ok(())
            }
            Err(err) => {
                let form = self.employee_forms.entry(manager_id).or_default();
                form.message = Some(format!("Create failed: {}", err));
                Err(err)
            }
        }
    }

    /// Deletion is gated on explicit confirmation and is never reflected
    /// locally before the server confirms; a declined confirmation issues
    /// no call at all. Returns whether a delete was actually performed.
    pub async fn delete_user(&mut self, user_id: i64) -> Result<bool, PortalError> {
        if !self.confirm.confirm(user_id) {
            info!("delete of user {} not confirmed, skipping", user_id);
            return Ok(false);
        }

        match self.users.delete_user(user_id).await {
            Ok(()) => {
                info!("user {} deleted", user_id);
                let _ = self.load_managers().await;
                Ok(true)
            }
            Err(err) => {
                // failed deletes escalate; the roster still shows the entity
                error!("failed to delete user {}: {}", user_id, err);
                self.alert = Some(format!("Delete failed: {}", err));
                Err(err)
            }
        }
    }
}
