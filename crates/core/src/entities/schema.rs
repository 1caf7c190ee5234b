//! Declarative entity schemas.
//!
//! Each entity kind declares the attribute holding its id and the fields that
//! point at other entities. Relations are resolved by kind, so schemas may
//! refer to each other in cycles (a balance points back at its account)
//! without the definitions themselves being recursive.

use super::entities_model::EntityKind;

/// Shape of a response root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// A single entity object.
    Entity(EntityKind),
    /// An array of entity objects.
    List(EntityKind),
}

impl Schema {
    pub fn kind(self) -> EntityKind {
        match self {
            Schema::Entity(kind) | Schema::List(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A field on an entity that references other entities.
///
/// `expand` controls denormalization only: foreign-key style fields such as
/// `bankAccountId` point at a parent and stay plain ids in rebuilt views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub field: &'static str,
    pub target: EntityKind,
    pub cardinality: Cardinality,
    pub expand: bool,
}

impl Relation {
    pub const fn one(field: &'static str, target: EntityKind) -> Self {
        Self {
            field,
            target,
            cardinality: Cardinality::One,
            expand: true,
        }
    }

    pub const fn many(field: &'static str, target: EntityKind) -> Self {
        Self {
            field,
            target,
            cardinality: Cardinality::Many,
            expand: true,
        }
    }

    pub const fn reference(field: &'static str, target: EntityKind) -> Self {
        Self {
            field,
            target,
            cardinality: Cardinality::One,
            expand: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub id_attribute: &'static str,
    pub relations: &'static [Relation],
}

const USER_RELATIONS: &[Relation] = &[];

const BANK_ACCOUNT_RELATIONS: &[Relation] = &[
    Relation::many("balances", EntityKind::BankAccountBalances),
    Relation::one("createdBy", EntityKind::Users),
    Relation::one("updatedBy", EntityKind::Users),
    Relation::one("deletedBy", EntityKind::Users),
];

const BANK_ACCOUNT_BALANCE_RELATIONS: &[Relation] = &[
    Relation::reference("bankAccountId", EntityKind::BankAccounts),
    Relation::one("createdBy", EntityKind::Users),
    Relation::one("updatedBy", EntityKind::Users),
    Relation::one("deletedBy", EntityKind::Users),
];

const VEHICLE_RELATIONS: &[Relation] = &[
    Relation::many("values", EntityKind::VehicleValues),
    Relation::one("createdBy", EntityKind::Users),
    Relation::one("updatedBy", EntityKind::Users),
    Relation::one("deletedBy", EntityKind::Users),
];

const VEHICLE_VALUE_RELATIONS: &[Relation] = &[
    Relation::reference("vehicleId", EntityKind::Vehicles),
    Relation::one("createdBy", EntityKind::Users),
    Relation::one("updatedBy", EntityKind::Users),
    Relation::one("deletedBy", EntityKind::Users),
];

const PROPERTY_RELATIONS: &[Relation] = &[
    Relation::many("values", EntityKind::PropertyValues),
    Relation::one("createdBy", EntityKind::Users),
    Relation::one("updatedBy", EntityKind::Users),
    Relation::one("deletedBy", EntityKind::Users),
];

const PROPERTY_VALUE_RELATIONS: &[Relation] = &[
    Relation::reference("propertyId", EntityKind::Properties),
    Relation::one("createdBy", EntityKind::Users),
    Relation::one("updatedBy", EntityKind::Users),
    Relation::one("deletedBy", EntityKind::Users),
];

static USER_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Users,
    id_attribute: "id",
    relations: USER_RELATIONS,
};

static BANK_ACCOUNT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::BankAccounts,
    id_attribute: "id",
    relations: BANK_ACCOUNT_RELATIONS,
};

static BANK_ACCOUNT_BALANCE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::BankAccountBalances,
    id_attribute: "id",
    relations: BANK_ACCOUNT_BALANCE_RELATIONS,
};

static VEHICLE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Vehicles,
    id_attribute: "id",
    relations: VEHICLE_RELATIONS,
};

static VEHICLE_VALUE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::VehicleValues,
    id_attribute: "id",
    relations: VEHICLE_VALUE_RELATIONS,
};

static PROPERTY_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Properties,
    id_attribute: "id",
    relations: PROPERTY_RELATIONS,
};

static PROPERTY_VALUE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::PropertyValues,
    id_attribute: "id",
    relations: PROPERTY_VALUE_RELATIONS,
};

impl EntityKind {
    /// The schema describing how records of this kind are normalized.
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Users => &USER_SCHEMA,
            EntityKind::BankAccounts => &BANK_ACCOUNT_SCHEMA,
            EntityKind::BankAccountBalances => &BANK_ACCOUNT_BALANCE_SCHEMA,
            EntityKind::Vehicles => &VEHICLE_SCHEMA,
            EntityKind::VehicleValues => &VEHICLE_VALUE_SCHEMA,
            EntityKind::Properties => &PROPERTY_SCHEMA,
            EntityKind::PropertyValues => &PROPERTY_VALUE_SCHEMA,
        }
    }
}
