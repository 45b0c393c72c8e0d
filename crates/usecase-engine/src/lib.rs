//! Use-case engine
//!
//! This crate lets business operations be declared as a tree of named steps
//! and then executed, documented, or audited.
//!
//! # Architecture
//!
//! ```text
//! UseCase<C: Contract>
//! ├── authorize(user)       - optional predicate, Err aborts the run
//! ├── setup(&mut Context)   - optional async hook wiring `ctx.di`
//! └── children: Vec<Node>   - executed in order, first Err short-circuits
//!     ├── Node::Step        - async or sync action producing an Outcome
//!     ├── Node::Branch      - condition step selecting `then` or `else`
//!     └── Node::UseCase     - nested use case sharing the parent context
//!
//! run(request, user)   -> Outcome
//! doc()                -> DocNode (static walk, nothing executes)
//! audit(request, user) -> Audited { outcome, trace: AuditTrace }
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use usecase_engine::{Contract, UseCase};
//!
//! let use_case = UseCase::<MyContract>::builder("rename a list")
//!   .request(RequestShape::new().field("list_id", "string"))
//!   .authorize(|user| Ok(if user.editor { Ok(()) } else { Err(MyError::Forbidden) }))
//!   .sync_step("validate name", |ctx| Ok(validate(ctx.req())))
//!   .step("store name", |ctx| Box::pin(async move { store(ctx).await }))
//!   .build()?;
//!
//! let outcome = use_case.run(request, user).await?;
//! let audited = use_case.audit(request, user).await?;
//! ```

mod audit;
mod branch;
mod context;
mod contract;
mod doc;
mod error;
mod execution;
mod node;
mod sink;
mod step;
mod use_case;

pub use audit::{
  AuditTrace, Audited, BranchTrace, SNAPSHOT_ERROR_KEY, StepTrace, TraceEntry, TraceOutcome,
};
pub use branch::Branch;
pub use context::Context;
pub use contract::{BoxError, Contract, Outcome, Verdict};
pub use doc::{DocNode, RequestShape};
pub use error::{DefinitionError, EngineError};
pub use node::Node;
pub use sink::{AuditSink, ChannelSink, LogSink, NoopSink};
pub use step::{Action, Step, StepFuture};
pub use use_case::{UseCase, UseCaseBuilder};
