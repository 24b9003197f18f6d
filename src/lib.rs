//! Cartesian parameter resolution for parameterized tests.
//!
//! A host framework describes each test operation as an [`OperationDecl`]: its slots and
//! the value sources attached to them. The [`CartesianEngine`] validates the
//! declaration, materializes one value sequence per slot and returns a [`Resolution`]
//! that enumerates every combination lazily, each with a display name.
//!
//! ```rust
//! use cartesian_engine::prelude::*;
//!
//! let op = OperationDecl::new("numbers_and_chars")
//!     .parameter("number", ParamType::Int, ValueSource::values([1, 2, 4]))
//!     .parameter("character", ParamType::String, ValueSource::values(["A", "B"]));
//!
//! let resolution = CartesianEngine::default().resolve(&op).unwrap();
//! assert_eq!(resolution.len(), 6);
//! let third = resolution.get(2).unwrap();
//! assert_eq!(resolution.display_name(&third), "[3] 2, A");
//! ```

// Error macros are defined here and must be declared before their users.
pub mod diagnostics;

pub mod arguments;
pub mod engine;
pub mod expansion;
pub mod logging;
pub mod naming;
pub mod plan;
pub mod registry;
pub mod settings;
pub mod signature;
pub mod sources;
pub mod validation;
pub mod value;

pub use crate::diagnostics::{CartesianError, ErrorType};
pub use crate::engine::{CartesianEngine, Resolution};
pub use crate::signature::{OperationDecl, ParameterSlot};

pub mod prelude {
    pub use crate::arguments::ArgumentSets;
    pub use crate::diagnostics::{CartesianError, ErrorType};
    pub use crate::engine::{CartesianEngine, Resolution};
    pub use crate::expansion::{CartesianProduct, InvocationTuple};
    pub use crate::naming::NameFormatter;
    pub use crate::registry::{OperationProvider, ParameterProvider, ProviderRegistry};
    pub use crate::settings::EngineSettings;
    pub use crate::signature::{
        HostResolver, InjectedTypes, NoHostInjection, OperationDecl, ParameterDecl, ParameterSlot,
    };
    pub use crate::sources::{
        EnumSource, FilterMode, NumericRange, OperationSource, ProviderRef, Range, ValueSource,
    };
    pub use crate::value::{CartesianEnum, EnumConstant, EnumType, ParamType, Value};
}
