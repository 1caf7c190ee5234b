//! Properties module.

mod properties_model;


pub use properties_model::{
    Property, PropertyAreaUnit, PropertyInput, PropertyStatus, PropertyType, PropertyValue,
    PropertyValueInput,
};
