//! # VERDANT
//!
//! Drives the streamed world without a renderer.
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────┐
//! │ 1. POLL ANCHOR                               │
//! │    └─ ScriptedAnchor advances by dt          │
//! │                                              │
//! │ 2. STEP WORLD                                │
//! │    ├─ Leaves: timers, motion, landings       │
//! │    ├─ Respawns                               │
//! │    └─ Window: generate ahead, evict behind   │
//! │                                              │
//! │ 3. ACCOUNT                                   │
//! │    └─ Frame time, slow-frame warning         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `anchor`: Scripted observer positions
//! - `driver`: Frame loop and run summary

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod anchor;
pub mod driver;

pub use verdant_core as core;
pub use verdant_procedural as procedural;

pub use anchor::{AnchorScript, ScriptedAnchor};
pub use driver::{FrameDriver, RunSummary, MAX_FRAME_TIME, TARGET_FRAME_TIME};
