//! Plan schema model.
//!
//! A schema declares the node kinds a plan may contain, the parameters each
//! kind accepts (with value types and defaults), and single inheritance
//! between kinds. Inheritance is resolved eagerly when the schema is loaded,
//! so every [`KindDefinition`] already carries its full parameter set.
//!
//! ```text
//! {
//!   "kinds": {
//!     "PathElement": { "params": [ {"id": "tolerance", "valueType": "number", "default": 1} ] },
//!     "Station":     { "parent": "PathElement", "params": [ ... ] }
//!   },
//!   "sites":     [ {"id": "ARC", "name": "Ames"} ],
//!   "platforms": [ {"id": "R", "name": "Rover"} ]
//! }
//! ```

mod error;
mod library;
mod loader;
mod types;
mod value;

pub use error::SchemaError;
pub use library::{Library, LibraryEntity};
pub use loader::{Schema, load_schema};
pub use types::{KindDefinition, ParamSpec, ValueType};
pub use value::{
    LonLat, ParamValue, line_from_geojson, line_to_geojson, point_from_geojson, point_to_geojson,
};

/// Kind names the document model gives structural meaning to.
pub mod kinds {
    pub const PLAN: &str = "Plan";
    pub const STATION: &str = "Station";
    pub const SEGMENT: &str = "Segment";
    pub const COMMAND: &str = "Command";
    pub const SEQUENCE: &str = "Sequence";
}
