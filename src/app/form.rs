//! Create/edit form state: field values, validation errors, focus and the
//! submit lifecycle.
//!
//! The mode depends only on whether initial data was supplied. Edit mode hides
//! the password field and never validates it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{UserFormData, UserPayload};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    Name,
    Email,
    BirthDate,
    City,
    State,
    Country,
    Password,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::BirthDate => "Birth Date",
            Self::City => "City",
            Self::State => "State",
            Self::Country => "Country",
            Self::Password => "Password",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "Enter full name",
            Self::Email => "email@example.com",
            Self::BirthDate => "YYYY-MM-DD",
            Self::City => "City",
            Self::State => "State",
            Self::Country => "Country",
            Self::Password => "Enter password",
        }
    }
}

/// Focusable element of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormFocus {
    Field(FormField),
    Cancel,
    Submit,
}

pub type FieldErrors = BTreeMap<FormField, String>;

#[derive(Clone, Debug)]
pub struct UserForm {
    data: UserFormData,
    errors: FieldErrors,
    editing: bool,
    submitting: bool,
    focus: usize,
}

impl UserForm {
    /// `Some` initial data opens the form in edit mode.
    pub fn new(initial: Option<UserFormData>) -> Self {
        let editing = initial.is_some();
        Self {
            data: initial.unwrap_or_default(),
            errors: FieldErrors::new(),
            editing,
            submitting: false,
            focus: 0,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn data(&self) -> &UserFormData {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn title(&self) -> &'static str {
        if self.editing { "Edit User" } else { "Add New User" }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Saving..."
        } else if self.editing {
            "Update User"
        } else {
            "Create User"
        }
    }

    /// Fields shown in this mode, in display order.
    pub fn visible_fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Name,
            FormField::Email,
            FormField::BirthDate,
            FormField::City,
            FormField::State,
            FormField::Country,
        ];
        if !self.editing {
            fields.push(FormField::Password);
        }
        fields
    }

    fn focus_order(&self) -> Vec<FormFocus> {
        let mut order: Vec<FormFocus> = self.visible_fields().into_iter().map(FormFocus::Field).collect();
        order.push(FormFocus::Cancel);
        order.push(FormFocus::Submit);
        order
    }

    pub fn focus(&self) -> FormFocus {
        let order = self.focus_order();
        order.get(self.focus).copied().unwrap_or(FormFocus::Submit)
    }

    pub fn focus_next(&mut self) {
        let len = self.focus_order().len();
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.focus_order().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.data.name,
            FormField::Email => &self.data.email,
            FormField::BirthDate => &self.data.birth_date,
            FormField::City => &self.data.city,
            FormField::State => &self.data.state,
            FormField::Country => &self.data.country,
            FormField::Password => &self.data.password,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.data.name,
            FormField::Email => &mut self.data.email,
            FormField::BirthDate => &mut self.data.birth_date,
            FormField::City => &mut self.data.city,
            FormField::State => &mut self.data.state,
            FormField::Country => &mut self.data.country,
            FormField::Password => &mut self.data.password,
        }
    }

    /// Replace a field's value and drop its error. Inputs are frozen while submitting.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        if self.submitting || (self.editing && field == FormField::Password) {
            return;
        }
        *self.value_mut(field) = value.into();
        self.errors.remove(&field);
    }

    pub fn input_char(&mut self, c: char) {
        if let FormFocus::Field(field) = self.focus() {
            let mut v = self.value(field).to_string();
            v.push(c);
            self.set_field(field, v);
        }
    }

    pub fn backspace(&mut self) {
        if let FormFocus::Field(field) = self.focus() {
            let mut v = self.value(field).to_string();
            v.pop();
            self.set_field(field, v);
        }
    }

    /// Check every rule and collect all failures.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let d = &self.data;

        if d.name.trim().is_empty() {
            errors.insert(FormField::Name, "Name is required".into());
        }

        if d.email.trim().is_empty() {
            errors.insert(FormField::Email, "Email is required".into());
        } else if !EMAIL_RE.is_match(&d.email) {
            errors.insert(FormField::Email, "Email is invalid".into());
        }

        if d.birth_date.trim().is_empty() {
            errors.insert(FormField::BirthDate, "Birth date is required".into());
        } else if NaiveDate::parse_from_str(d.birth_date.trim(), "%Y-%m-%d").is_err() {
            errors.insert(FormField::BirthDate, "Birth date must be YYYY-MM-DD".into());
        }

        for (field, value, msg) in [
            (FormField::City, &d.city, "City is required"),
            (FormField::State, &d.state, "State is required"),
            (FormField::Country, &d.country, "Country is required"),
        ] {
            if value.trim().is_empty() {
                errors.insert(field, msg.into());
            }
        }

        if !self.editing {
            if d.password.is_empty() {
                errors.insert(FormField::Password, "Password is required".into());
            } else if d.password.chars().count() < 6 {
                errors.insert(FormField::Password, "Password must be at least 6 characters".into());
            }
        }

        errors
    }

    /// Validate and, if clean, enter the submitting state and return the
    /// request body. On failure the errors are kept for display.
    pub fn submit(&mut self) -> Result<UserPayload, FieldErrors> {
        if self.submitting {
            return Err(FieldErrors::new());
        }
        let errors = self.validate();
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(errors);
        }
        self.errors.clear();
        self.submitting = true;
        Ok(self.data.to_payload(!self.editing))
    }

    /// Submit finished (either way): inputs become editable again.
    pub fn settle(&mut self) {
        self.submitting = false;
    }

    pub fn can_cancel(&self) -> bool {
        !self.submitting
    }
}
