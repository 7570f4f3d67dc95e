//! Field roles and registries of the individual account forms.

use crate::{
	check::Check,
	form::{FieldRole, FormView, Registry, Rule},
};
use tracing::trace;

/// Write access to fields, needed by forms that fill in some fields on the user's behalf.
pub trait FieldWriter<F> {
	fn set_value(&self, field: F, value: &str);
	fn set_disabled(&self, field: F, disabled: bool);
}

macro_rules! field_roles {
	($(#[$attr:meta])* $name:ident { $($(#[$variant_attr:meta])* $variant:ident => $id:literal),+ $(,)? }) => {
		$(#[$attr])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum $name {
			$($(#[$variant_attr])* $variant),+
		}

		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];
		}

		impl FieldRole for $name {
			fn id(self) -> &'static str {
				match self {
					$(Self::$variant => $id),+
				}
			}
		}
	};
}

field_roles! {
	/// Fields of the login form (also embedded in the request payment page).
	LoginField {
		Email => "login-email",
		Password => "login-password",
	}
}

impl LoginField {
	#[must_use]
	pub fn registry() -> Registry<Self> {
		Registry::new()
			.with(Self::Email, Rule::Check(Check::Email))
			.with(Self::Password, Rule::Check(Check::Password))
	}
}

field_roles! {
	/// Fields of the signup form (also embedded in the request payment page).
	SignupField {
		Name => "signup-name",
		Email => "signup-email",
		Password => "signup-password",
		ConfirmPassword => "signup-confirm-password",
		PayPalEmail => "signup-paypal-email",
		/// Checkbox: use [`SignupField::Email`] as PayPal email.
		CopyEmail => "signup-copy-email",
	}
}

impl SignupField {
	#[must_use]
	pub fn registry() -> Registry<Self> {
		Registry::new()
			.with(Self::Name, Rule::Check(Check::FullName))
			.with(Self::Email, Rule::Check(Check::Email))
			.with(Self::Password, Rule::Check(Check::Password))
			.with(Self::ConfirmPassword, Rule::Matches(Self::Password))
			.with(
				Self::PayPalEmail,
				Rule::Unless {
					checked: Self::CopyEmail,
					check: Check::Email,
				},
			)
	}
}

/// Brings the PayPal email field in line with the "copy email" checkbox:
/// While it is checked, the field is disabled and mirrors the primary email.
///
/// Call this when the checkbox is toggled and once on page load (to handle restored form state).
pub fn sync_paypal_email<V>(view: &V)
where
	V: FormView<SignupField> + FieldWriter<SignupField> + ?Sized,
{
	let copy = view.is_checked(SignupField::CopyEmail);
	view.set_disabled(SignupField::PayPalEmail, copy);
	if copy {
		copy_primary_email(view)
	}
}

/// Copies the primary email into the PayPal email field if the "copy email" checkbox is checked.
///
/// Call this on each input on [`SignupField::Email`].
pub fn maybe_copy_email<V>(view: &V)
where
	V: FormView<SignupField> + FieldWriter<SignupField> + ?Sized,
{
	if view.is_checked(SignupField::CopyEmail) {
		copy_primary_email(view)
	}
}

fn copy_primary_email<V>(view: &V)
where
	V: FormView<SignupField> + FieldWriter<SignupField> + ?Sized,
{
	trace!("Copying primary email to PayPal email.");
	view.set_value(SignupField::PayPalEmail, &view.value(SignupField::Email))
}

field_roles! {
	/// Fields of the account settings form.
	SettingsField {
		Name => "name",
		PayPalEmail => "paypal-email",
	}
}

impl SettingsField {
	#[must_use]
	pub fn registry() -> Registry<Self> {
		Registry::new()
			.with(Self::Name, Rule::Check(Check::FullName))
			.with(Self::PayPalEmail, Rule::Check(Check::Email))
	}
}

field_roles! {
	/// Fields of the change password form, which also serves password reset links.
	ChangePasswordField {
		CurrentPassword => "current-password",
		NewPassword => "new-password",
		ConfirmPassword => "confirm-password",
	}
}

impl ChangePasswordField {
	/// Password resets (arriving through an emailed link) don't ask for the current password.
	#[must_use]
	pub fn registry(reset: bool) -> Registry<Self> {
		let mut registry = Registry::new()
			.with(Self::NewPassword, Rule::Check(Check::Password))
			.with(Self::ConfirmPassword, Rule::Matches(Self::NewPassword));
		if !reset {
			registry.insert(Self::CurrentPassword, Rule::Check(Check::Password));
		}
		registry
	}
}

field_roles! {
	/// Fields of the "forgot password" form.
	ResetPasswordField {
		Email => "email",
	}
}

impl ResetPasswordField {
	#[must_use]
	pub fn registry() -> Registry<Self> {
		Registry::new().with(Self::Email, Rule::Check(Check::Email))
	}
}
