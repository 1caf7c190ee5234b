//! Vehicles module.

mod vehicles_model;


pub use vehicles_model::{
    Vehicle, VehicleInput, VehicleStatus, VehicleType, VehicleValue, VehicleValueInput,
};
