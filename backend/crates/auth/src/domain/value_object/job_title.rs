//! Job Title Value Object

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Clinic position held by an employee
///
/// Informational only. Access is governed by [`super::role::Role`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum JobTitle {
    #[display("Veterinarian")]
    Veterinarian = 0,
    #[display("Veterinarian Technician")]
    VeterinarianTechnician = 1,
    #[display("Veterinary Assistant")]
    VeterinaryAssistant = 2,
    #[display("Manager")]
    Manager = 3,
}

impl JobTitle {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use JobTitle::*;
        match self {
            Veterinarian => "VETERINARIAN",
            VeterinarianTechnician => "VETERINARIAN_TECHNICIAN",
            VeterinaryAssistant => "VETERINARY_ASSISTANT",
            Manager => "MANAGER",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        use JobTitle::*;
        match id {
            0 => Some(Veterinarian),
            1 => Some(VeterinarianTechnician),
            2 => Some(VeterinaryAssistant),
            3 => Some(Manager),
            _ => None,
        }
    }
}
