#![doc(html_root_url = "https://docs.rs/payreq-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod check;
pub mod composite;
pub mod form;
pub mod forms;
pub mod listeners;
pub mod payments;

#[cfg(target_arch = "wasm32")]
pub mod load;
#[cfg(target_arch = "wasm32")]
pub mod web;
