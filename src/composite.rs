//! The request payment form, which embeds the signup and login forms for visitors who aren't logged in.

use crate::{
	check::Check,
	form::{Activation, FieldRole, FormView, Registry, Rule, ValidationSession},
	forms::{LoginField, SignupField},
};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use tracing::{instrument, trace};

/// Fields of the request payment form proper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestField {
	PayerEmail,
	Amount,
	Description,
}

impl FieldRole for RequestField {
	fn id(self) -> &'static str {
		match self {
			RequestField::PayerEmail => "payer-email",
			RequestField::Amount => "amount",
			RequestField::Description => "description",
		}
	}
}

impl RequestField {
	#[must_use]
	pub fn registry() -> Registry<Self> {
		Registry::new()
			.with(Self::PayerEmail, Rule::Check(Check::Email))
			.with(Self::Amount, Rule::Check(Check::Amount))
			.with(Self::Description, Rule::Check(Check::Description))
	}
}

/// Which account sub-form is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountTab {
	Signup,
	Login,
}

/// Tells which account sub-form the visitor is currently looking at.
pub trait AccountTabs {
	fn showing(&self) -> AccountTab;
}

/// The signup and login sub-forms of a request payment page.
pub struct Account {
	pub signup: Rc<ValidationSession<SignupField>>,
	pub login: Rc<ValidationSession<LoginField>>,
	pub tabs: Rc<dyn AccountTabs>,
}

impl Debug for Account {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Account")
			.field("signup", &self.signup)
			.field("login", &self.login)
			.field("showing", &self.tabs.showing())
			.finish()
	}
}

/// A request payment form and, for anonymous visitors, its account sub-forms.
#[derive(Debug)]
pub struct RequestPaymentForm {
	request: Rc<ValidationSession<RequestField>>,
	account: Option<Account>,
}

impl RequestPaymentForm {
	/// A form for a logged-in user.
	#[must_use]
	pub fn new(view: Rc<dyn FormView<RequestField>>) -> Self {
		Self {
			request: ValidationSession::new(RequestField::registry(), view, Activation::OnCheck),
			account: None,
		}
	}

	/// A form for an anonymous visitor, who signs up or logs in while requesting the payment.
	#[must_use]
	pub fn with_account(
		view: Rc<dyn FormView<RequestField>>,
		signup_view: Rc<dyn FormView<SignupField>>,
		login_view: Rc<dyn FormView<LoginField>>,
		tabs: Rc<dyn AccountTabs>,
	) -> Self {
		Self {
			request: ValidationSession::new(RequestField::registry(), view, Activation::OnCheck),
			account: Some(Account {
				signup: ValidationSession::new(SignupField::registry(), signup_view, Activation::OnCheck),
				login: ValidationSession::new(LoginField::registry(), login_view, Activation::OnCheck),
				tabs,
			}),
		}
	}

	#[must_use]
	pub fn request(&self) -> &Rc<ValidationSession<RequestField>> {
		&self.request
	}

	#[must_use]
	pub fn account(&self) -> Option<&Account> {
		self.account.as_ref()
	}

	/// Checks (and arms) every part of the form, including the hidden account sub-form,
	/// so that all error text stays current when the visitor switches tabs.
	///
	/// Only the visible account sub-form counts towards the result.
	#[instrument]
	pub fn check_form(&self) -> bool {
		let request = self.request.check_form();
		match &self.account {
			None => request,
			Some(account) => {
				let signup = account.signup.check_form();
				let login = account.login.check_form();
				let showing = account.tabs.showing();
				trace!(request, signup, login, ?showing);
				request
					&& match showing {
						AccountTab::Signup => signup,
						AccountTab::Login => login,
					}
			}
		}
	}
}
