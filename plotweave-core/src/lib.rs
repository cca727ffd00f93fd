//! Plotweave Core
//!
//! This crate provides the scene-update runtime for animated statistical
//! plots. It implements:
//!
//! - A retained, headless render surface
//! - A keyed enter/update/exit reconciler that binds datasets to the surface
//! - Attribute tweens and named, cancellable transition chains on a virtual
//!   clock
//! - Scales, reference glyphs, slider controls and a computation cache for
//!   assembling interactive charts
//!
//! # Architecture
//!
//! - `scene`: node arena and element selection
//! - `animation`: the [`Stage`](animation::Stage), its timeline, tweens and
//!   transition chains
//! - `join`: datums, the glyph contract and the reconciler
//! - `glyphs`: ready-made point and arrow glyphs
//! - `scale`: linear scales with nice domains
//! - `chart`: the scatter plot assembler
//! - `controls`: sliders and pointer controllers
//! - `cache`: parameter-keyed memoization
//! - `config`: serde chart configuration
//! - `driver`: tokio frame loop
//!
//! Everything that touches the stage runs on one thread. Callbacks receive
//! `&mut Stage`, so a callback may re-render or restart a transition without
//! any locking.
//!
//! # Example
//!
//! ```rust
//! use plotweave_core::animation::Stage;
//! use plotweave_core::chart::ScatterPlot;
//! use plotweave_core::config::ChartConfig;
//! use plotweave_core::glyphs::PointGlyph;
//! use plotweave_core::join::Point2;
//!
//! let mut stage = Stage::new();
//! let root = stage.surface().root();
//! let container = stage.surface_mut().append(root, "div").unwrap();
//! stage.surface_mut().set_attr(container, "id", "scatter");
//!
//! let mut plot = ScatterPlot::mount(&mut stage, "#scatter", ChartConfig::default())
//!     .expect("container exists");
//!
//! let data = vec![Point2::new(0u32, 0.5, 1.0), Point2::new(1, 1.5, 0.2)];
//! plot.render(&mut stage, &data, &PointGlyph::default());
//!
//! stage.run_until_idle();
//! assert_eq!(plot.reconciler().len(), 2);
//! ```

pub mod animation;
pub mod cache;
pub mod chart;
pub mod config;
pub mod controls;
pub mod driver;
pub mod error;
pub mod glyphs;
pub mod join;
pub mod scale;
pub mod scene;

pub use error::{Error, Result};
