//! The MDR Annex VIII field catalog.
//!
//! Declaration order inside each table is the order questions are asked in;
//! gating fields come before the fields they gate.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::field::{FieldDefinition as F, Requirement::*};
use super::{FieldDefinition, SectionId};

pub const DURATIONS: &[&str] = &["TRANSIENT", "SHORT_TERM", "LONG_TERM"];

pub const ORIFICE_LOCATIONS: &[&str] = &[
    "ORAL_CAVITY",
    "EAR_CANAL",
    "NASAL_CAVITY",
    "STOMA",
    "OTHER_ORIFICE",
];

pub const ORTHOPAEDIC_IMPLANT_TYPES: &[&str] = &[
    "JOINT_REPLACEMENT",
    "SPINAL_DISC",
    "ANCILLARY_COMPONENTS",
    "NONE",
];

pub const NON_INVASIVE_FUNCTIONS: &[&str] = &[
    "CHANNELS_OR_STORES_LIQUIDS",
    "BLOOD_BAG",
    "MODIFIES_BLOOD_OR_TISSUE",
    "CONTACTS_INJURED_SKIN",
    "OTHER_NON_INVASIVE",
];

pub const ACTIVE_FUNCTIONS: &[&str] = &[
    "THERAPEUTIC_ENERGY_EXCHANGE",
    "CONTROLS_CLASS_IIB_THERAPEUTIC",
    "DIAGNOSTIC_OR_MONITORING",
    "ILLUMINATES_BODY",
    "ADMINISTERS_OR_REMOVES_SUBSTANCES",
    "CLOSED_LOOP_OR_AED",
    "OTHER_ACTIVE",
];

pub const DECISION_IMPACTS: &[&str] = &["DEATH_OR_IRREVERSIBLE", "SERIOUS_DETERIORATION", "OTHER"];

pub const SPECIAL_RULES: &[&str] = &[
    "INCORPORATES_MEDICINAL_SUBSTANCE",
    "CONTRACEPTION_OR_STD_PREVENTION",
    "DISINFECTS_CONTACT_LENSES",
    "DISINFECTS_MEDICAL_DEVICES",
    "RECORDS_XRAY_IMAGES",
    "BIOLOGICAL_TISSUES_OR_CELLS",
    "INCORPORATES_NANOMATERIAL",
    "ADMINISTERS_VIA_INHALATION",
    "ABSORBED_BY_BODY",
    "NONE",
];

static TRIAGE: [FieldDefinition; 5] = [
    F::text(
        "device_name",
        "The name or a short description of the medical device.",
    ),
    F::boolean(
        "is_invasive",
        "Does the device, in whole or in part, penetrate inside the body, either through a body orifice or through the surface of the body?",
    ),
    F::choice(
        "duration",
        DURATIONS,
        "The intended continuous duration of use: TRANSIENT (under 60 minutes), SHORT_TERM (60 minutes to 30 days) or LONG_TERM (over 30 days).",
    )
    .when("is_invasive", Is(true)),
    F::boolean(
        "is_active",
        "Does the device depend on a source of energy other than that generated by the human body or gravity (e.g. electricity, batteries)?",
    ),
    F::boolean(
        "is_software",
        "Is the device standalone software intended for a medical purpose?",
    ),
];

static INVASIVE: [FieldDefinition; 11] = [
    F::boolean(
        "is_surgically_invasive",
        "Does the device penetrate the body through its surface with the aid of or in the context of a surgical operation, rather than through a natural body orifice?",
    ),
    F::choice(
        "orifice_location",
        ORIFICE_LOCATIONS,
        "Which body orifice the device enters: the oral cavity, the ear canal, the nasal cavity, a surgically created stoma, or another orifice.",
    )
    .when("is_surgically_invasive", Is(false)),
    F::boolean(
        "connected_to_active_device",
        "Is the device intended to be connected to an active medical device of class IIa or higher?",
    )
    .when("is_surgically_invasive", Is(false)),
    F::boolean(
        "is_implantable",
        "Is the device intended to be totally introduced into the body, or to replace an epithelial surface, and to remain there after the procedure?",
    )
    .when("is_surgically_invasive", Is(true)),
    F::boolean(
        "contacts_cns_or_heart",
        "Is the device intended for direct contact with the heart, the central circulatory system or the central nervous system?",
    )
    .when("is_surgically_invasive", Is(true)),
    F::boolean(
        "is_reusable_instrument",
        "Is the device a reusable surgical instrument (for cutting, drilling, sawing, scratching, scraping, clamping, retracting or similar) not connected to an active device?",
    )
    .when("is_surgically_invasive", Is(true)),
    F::boolean(
        "supplies_ionizing_radiation",
        "Is the device intended to supply energy in the form of ionizing radiation?",
    )
    .when("is_surgically_invasive", Is(true)),
    F::boolean(
        "biological_effect_or_absorbed",
        "Does the device have a biological effect, or is it wholly or mainly absorbed by the body?",
    ),
    F::boolean(
        "administers_medicines",
        "Is the device intended to administer medicinal products?",
    ),
    F::choice(
        "orthopaedic_implant_type",
        ORTHOPAEDIC_IMPLANT_TYPES,
        "Whether the implant is a total or partial joint replacement, a spinal disc replacement, an ancillary component such as a screw, wedge or plate, or none of these.",
    )
    .when("is_implantable", Is(true)),
    F::boolean(
        "breast_implant_or_mesh",
        "Is the device a breast implant or a surgical mesh?",
    )
    .when("is_implantable", Is(true)),
];

static NON_INVASIVE: [FieldDefinition; 2] = [
    F::choice(
        "non_invasive_function",
        NON_INVASIVE_FUNCTIONS,
        "The primary function of the non-invasive device: channelling or storing liquids or gases for infusion, being a blood bag, modifying the composition of blood or other body tissues, contacting injured skin or mucous membrane, or something else.",
    ),
    F::boolean(
        "connected_to_class_iia_or_higher",
        "Is the device intended to be connected to an active medical device of class IIa or higher?",
    )
    .when("non_invasive_function", Equals("CHANNELS_OR_STORES_LIQUIDS")),
];

static ACTIVE: [FieldDefinition; 4] = [
    F::choice(
        "active_function",
        ACTIVE_FUNCTIONS,
        "The primary function of the active device: therapeutic exchange of energy, controlling a class IIb therapeutic device, diagnosis or monitoring, illuminating the body in the visible spectrum, administering or removing substances, a closed-loop or automated external defibrillator system, or another active function.",
    ),
    F::boolean(
        "energy_potentially_hazardous",
        "Is the energy exchanged with the body potentially hazardous, given its nature, density and site of application?",
    )
    .when("active_function", Equals("THERAPEUTIC_ENERGY_EXCHANGE")),
    F::boolean(
        "monitors_vital_parameters",
        "Is the device intended to monitor vital physiological parameters where variations could result in immediate danger to the patient?",
    )
    .when("active_function", Equals("DIAGNOSTIC_OR_MONITORING")),
    F::boolean(
        "emits_ionizing_radiation",
        "Does the device emit ionizing radiation for diagnostic or therapeutic purposes?",
    ),
];

static SOFTWARE: [FieldDefinition; 4] = [
    F::boolean(
        "influences_treatment_decisions",
        "Does the software provide information used to take decisions for diagnosis or therapeutic purposes?",
    ),
    F::choice(
        "decision_impact",
        DECISION_IMPACTS,
        "The worst impact those decisions could have: death or irreversible deterioration of health, serious deterioration of health or a surgical intervention, or something less severe.",
    )
    .when("influences_treatment_decisions", Is(true)),
    F::boolean(
        "monitors_physiological_processes",
        "Is the software intended to monitor physiological processes?",
    ),
    F::boolean(
        "vital_parameter_danger",
        "Does it monitor vital physiological parameters where variations could result in immediate danger to the patient?",
    )
    .when("monitors_physiological_processes", Is(true)),
];

static SPECIAL: [FieldDefinition; 1] = [F::multi_choice(
    "special_rules",
    SPECIAL_RULES,
    "Any special characteristics that apply: incorporates a medicinal substance, used for contraception or STD prevention, disinfects contact lenses, disinfects or sterilizes other medical devices, records diagnostic X-ray images, made with tissues or cells of human or animal origin, incorporates nanomaterial, administers medicine by inhalation, is a substance absorbed by the body, or none of these.",
)];

/// Where a field lives.
#[derive(Debug, Clone, Copy)]
pub struct FieldEntry {
    pub section: SectionId,
    pub definition: &'static FieldDefinition,
}

static FIELD_INDEX: Lazy<HashMap<&'static str, FieldEntry>> = Lazy::new(|| {
    SectionId::ALL
        .iter()
        .flat_map(|section| {
            fields_of(*section).iter().map(move |definition| {
                (
                    definition.name,
                    FieldEntry {
                        section: *section,
                        definition,
                    },
                )
            })
        })
        .collect()
});

/// Field table of a section.
pub fn fields_of(section: SectionId) -> &'static [FieldDefinition] {
    match section {
        SectionId::Triage => &TRIAGE,
        SectionId::Invasive => &INVASIVE,
        SectionId::NonInvasive => &NON_INVASIVE,
        SectionId::Active => &ACTIVE,
        SectionId::Software => &SOFTWARE,
        SectionId::SpecialRules => &SPECIAL,
    }
}

/// Looks a field up by name across all sections.
pub fn lookup(name: &str) -> Option<FieldEntry> {
    FIELD_INDEX.get(name).copied()
}

/// Every field in catalog order (sections in [`SectionId::ALL`] order).
pub fn all_fields() -> impl Iterator<Item = &'static FieldDefinition> {
    SectionId::ALL.iter().flat_map(|s| fields_of(*s).iter())
}
