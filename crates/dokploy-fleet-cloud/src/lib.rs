//! dokploy-fleet cloud declarations
//!
//! Provider-neutral building blocks for describing infrastructure and handing
//! it to an external provisioning engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               dokploy-fleet CLI                  │
//! │          (validate / preview / up / outputs)     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              dokploy-fleet-cloud                 │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ ResourceSet  │  │   Outputs    │            │
//! │  └──────────────┘  └──────────────┘            │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait ProvisioningEngine { ... }        │   │
//! │  └──────────────────────────────────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │   manifest    │ │  state.json   │
//! │  (to engine)  │ │ (from engine) │
//! └───────────────┘ └───────────────┘
//! ```

pub mod action;
pub mod engine;
pub mod error;
pub mod output;
pub mod resource;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use engine::{ManifestEngine, ProvisioningEngine};
pub use error::{CloudError, Result};
pub use output::{OutputRef, OutputValue, Outputs, ResolvedValue};
pub use resource::{ResourceConfig, ResourceSet};
pub use state::{GlobalState, Manifest, ResourceState, STATE_DIR, StateLock, StateManager};
