//! The validation engine: field check registries, [`run_checks`] and per-form [`ValidationSession`]s.

use crate::check::{self, Check, CheckError};
use core::{cell::Cell, fmt::Debug, hash::Hash};
use hashbrown::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, instrument, trace};

/// A typed field identifier, unique within one form.
pub trait FieldRole: Debug + Copy + Eq + Hash + 'static {
	/// The element ID of the input backing this field.
	fn id(self) -> &'static str;
}

/// How a registered field is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule<F> {
	/// Validate the field's own value.
	Check(Check),
	/// The field must equal the current value of another field.
	Matches(F),
	/// Like [`Rule::Check`], but skipped (and passing) while the given checkbox field is checked.
	Unless { checked: F, check: Check },
}

impl<F: FieldRole> Rule<F> {
	/// # Errors
	///
	/// Iff the current value of `field` doesn't satisfy this rule.
	pub fn evaluate(self, field: F, view: &(impl FormView<F> + ?Sized)) -> Result<(), CheckError> {
		match self {
			Rule::Check(check) => check.apply(&view.value(field)),
			Rule::Matches(other) => check::confirm(&view.value(field), &view.value(other)),
			Rule::Unless { checked, .. } if view.is_checked(checked) => Ok(()),
			Rule::Unless { check, .. } => check.apply(&view.value(field)),
		}
	}

	/// Fields other than the registered one that this rule reads.
	fn references(self) -> Option<F> {
		match self {
			Rule::Check(_) => None,
			Rule::Matches(other) => Some(other),
			Rule::Unless { checked, .. } => Some(checked),
		}
	}
}

/// Maps each validated field of one form to its [`Rule`].
///
/// Fields that aren't registered are never validated and their error text is never touched.
#[derive(Debug, Clone)]
pub struct Registry<F: FieldRole>(HashMap<F, Rule<F>>);

impl<F: FieldRole> Default for Registry<F> {
	fn default() -> Self {
		Self::new()
	}
}

impl<F: FieldRole> Registry<F> {
	#[must_use]
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	/// Registers `rule` for `field`, replacing any previous rule for it.
	#[must_use]
	pub fn with(mut self, field: F, rule: Rule<F>) -> Self {
		self.insert(field, rule);
		self
	}

	pub fn insert(&mut self, field: F, rule: Rule<F>) -> Option<Rule<F>> {
		self.0.insert(field, rule)
	}

	#[must_use]
	pub fn rule(&self, field: F) -> Option<Rule<F>> {
		self.0.get(&field).copied()
	}

	pub fn fields(&self) -> impl '_ + Iterator<Item = F> {
		self.0.keys().copied()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// All fields whose input can change the outcome of a run, i.e. registered ones and the ones their rules read.
	#[must_use]
	pub fn watched(&self) -> Vec<F> {
		let mut watched: Vec<F> = self.fields().collect();
		for rule in self.0.values() {
			if let Some(other) = rule.references() {
				if !watched.contains(&other) {
					watched.push(other)
				}
			}
		}
		watched
	}
}

/// The part of a page a form's validation reads from and writes to.
pub trait FormView<F> {
	/// The field's current value.
	fn value(&self, field: F) -> String;

	/// Whether the field (a checkbox) is currently checked.
	fn is_checked(&self, field: F) -> bool;

	/// Replaces the error text shown next to `field`. An empty `message` clears it.
	fn set_error(&self, field: F, message: &str);

	/// Calls `handler` after each input event on any of `fields`, for the remaining lifetime of the view.
	fn on_input(&self, fields: &[F], handler: Rc<dyn Fn()>);
}

/// Validates every field in `registry` against `view`, updating each field's error text.
///
/// All fields are checked even after a failure, so no stale error text remains anywhere.
///
/// Returns whether every field passed.
#[instrument(skip(registry, view), fields(fields = registry.len()))]
pub fn run_checks<F: FieldRole>(registry: &Registry<F>, view: &(impl FormView<F> + ?Sized)) -> bool {
	let mut valid = true;
	for (&field, &rule) in &registry.0 {
		match rule.evaluate(field, view) {
			Ok(()) => view.set_error(field, ""),
			Err(error) => {
				#[cfg(feature = "dangerous-logging")]
				trace!(?field, value = %view.value(field), %error, "Field failed its check.");
				#[cfg(not(feature = "dangerous-logging"))]
				trace!(?field, %error, "Field failed its check.");

				view.set_error(field, &error.to_string());
				valid = false;
			}
		}
	}
	valid
}

/// Whether a [`ValidationSession`] validates on every input from the start or only after the first explicit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
	/// Live validation starts with the first [`ValidationSession::check_form`].
	OnCheck,
	/// Live validation is active as soon as the session exists.
	Immediate,
}

/// Run-time validation state of one form.
///
/// Once armed, every input event on a watched field re-runs all checks.
/// Arming happens at most once per session and is never undone.
pub struct ValidationSession<F: FieldRole> {
	registry: Registry<F>,
	view: Rc<dyn FormView<F>>,
	armed: Cell<bool>,
	this: Weak<Self>,
}

impl<F: FieldRole> Debug for ValidationSession<F> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ValidationSession")
			.field("registry", &self.registry)
			.field("armed", &self.armed.get())
			.finish_non_exhaustive()
	}
}

impl<F: FieldRole> ValidationSession<F> {
	#[must_use]
	pub fn new(registry: Registry<F>, view: Rc<dyn FormView<F>>, activation: Activation) -> Rc<Self> {
		let session = Rc::new_cyclic(|this| Self {
			registry,
			view,
			armed: Cell::new(false),
			this: this.clone(),
		});
		if activation == Activation::Immediate {
			session.arm();
		}
		session
	}

	#[must_use]
	pub fn is_armed(&self) -> bool {
		self.armed.get()
	}

	#[must_use]
	pub fn registry(&self) -> &Registry<F> {
		&self.registry
	}

	#[must_use]
	pub fn view(&self) -> &Rc<dyn FormView<F>> {
		&self.view
	}

	/// Runs all checks once, without arming.
	pub fn run_checks(&self) -> bool {
		run_checks(&self.registry, &*self.view)
	}

	/// Arms live validation if that hasn't happened yet, then runs all checks once.
	///
	/// Returns whether the form is currently valid, i.e. whether submission should proceed.
	#[instrument]
	pub fn check_form(&self) -> bool {
		self.arm();
		self.run_checks()
	}

	fn arm(&self) {
		if self.armed.replace(true) {
			return;
		}
		debug!("Arming live validation.");
		let this = self.this.clone();
		self.view.on_input(
			&self.registry.watched(),
			Rc::new(move || {
				if let Some(session) = this.upgrade() {
					session.run_checks();
				}
			}),
		);
	}
}
