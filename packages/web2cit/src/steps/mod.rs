//! Steps: the units a procedure is built from.
//!
//! - [`Selection`] - reads a webpage (page DOM or Citoid citation)
//! - [`Transformation`] - pure rewrite of a step output
//!
//! Both are closed enums built from their JSON definitions through `create`.
//! Steps are immutable; `with_config` / `with_itemwise` validate and return
//! a rebuilt step.

pub mod date;
pub mod range;
pub mod selection;
pub mod transformation;

/// Ordered sequence of strings passed between steps.
pub type StepOutput = Vec<String>;

pub use date::{parse_date, DateLocale};
pub use range::{RangeBound, RangeSpec};
pub use selection::{CitoidSelection, Selection, XPathSelection};
pub use transformation::{
    DateTransformation, JoinTransformation, RangeTransformation, SplitTransformation,
    Transformation,
};
