//! # standin
//!
//! The setup and verification engine behind a mocking library.
//!
//! `standin` records *setups* (expected interactions on a substitute
//! object together with their canned responses), decides which setup
//! handles each call made on a substitute, and later verifies that the
//! expected calls actually happened.
//!
//! Creating real proxy objects and intercepting calls is left to the
//! layer in front of the engine: it hands over [`Declaration`]s and
//! [`CallEvent`]s and gets [`Resolution`]s and verification results
//! back.
//!
//! ```
//! use standin::{matcher, CallEvent, Declaration, Expression, Repository, Returned};
//!
//! let repository = Repository::new();
//! let store = repository.create("store");
//!
//! // later setups win over earlier equivalent ones
//! repository
//!     .setup(store, Declaration::new(Expression::method("get", (matcher::any(),))).returns(0))
//!     .unwrap();
//! repository
//!     .setup(store, Declaration::new(Expression::method("get", (matcher::eq("a"),))).returns(1))
//!     .unwrap();
//!
//! let call = CallEvent::method("get", ("a",));
//! let resolved = repository.resolve(store, &call).unwrap().into_result().unwrap();
//! assert_eq!(resolved.response().produce(&call), Returned::Value(standin::Arg::new(1)));
//!
//! let call = CallEvent::method("get", ("b",));
//! let resolved = repository.resolve(store, &call).unwrap().into_result().unwrap();
//! assert_eq!(resolved.response().produce(&call), Returned::Value(standin::Arg::new(0)));
//! ```
//!
//! ## Fluent chains
//!
//! A setup reaching through several members, such as
//! `root.Service.fetch(3)`, is declared with a [`ChainDeclaration`].
//! The engine registers one setup per step, each returning an inner
//! substitute on which the next step is registered, and verification
//! follows those inner substitutes.

mod chain;
mod error;
mod expression;
mod registry;
mod repository;
mod response;
mod setup;
mod substitute;
mod times;
mod value;
mod verify;

pub mod matcher;

pub use chain::{ChainDeclaration, FluentId, FluentSetup, Step};
pub use error::{Error, MalformedChain, Result, UnhandledCall};
pub use expression::{CallEvent, Expression, Member, MemberKind};
pub use matcher::ArgMatcher;
pub use registry::{Resolution, Resolved};
pub use repository::{Config, Repository};
pub use response::{Response, Returned};
pub use setup::{Condition, Declaration, Setup, SetupHandle, SetupId, SetupInfo};
pub use substitute::SubstituteId;
pub use times::Times;
pub use value::{Arg, ArgValue, IntoArgs};
pub use verify::{VerificationFailure, Violation};
