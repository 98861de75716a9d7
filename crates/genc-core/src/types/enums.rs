//! # Closed Enumerations
//!
//! Every enumerated field of the record model. Each enum carries two string
//! forms:
//! - `key()`: the stable SCREAMING_CASE name used by reference-data listings
//! - `label()`: the human-facing value used on the wire and in reports
//!
//! Parsing accepts either form, case-insensitively.

use super::GencError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($key:literal, $label:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable SCREAMING_CASE key.
            #[must_use]
            pub const fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Display label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = GencError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| {
                        v.label().eq_ignore_ascii_case(wanted) || v.key().eq_ignore_ascii_case(wanted)
                    })
                    .ok_or_else(|| GencError::InvalidField {
                        field: stringify!($name),
                        reason: format!("unknown value '{}'", wanted),
                    })
            }
        }
    };
}

labeled_enum! {
    /// Lifecycle status of a GenC.
    ///
    /// Legal moves between these values are decided by
    /// [`crate::lifecycle`]; nothing else may change a stored status.
    pub enum Status {
        Idle => ("IDLE", "Idle"),
        UnderProjectTraining => ("UNDER_PROJECT_TRAINING", "Under Project Training"),
        CustomerOnboarded => ("CUSTOMER_ONBOARDED", "Customer Onboarded"),
        BillingPlanned => ("BILLING_PLANNED", "Billing Planned"),
        FeedbackNotGood => ("FEEDBACK_NOT_GOOD", "Feedback Not Good"),
        BillingStarted => ("BILLING_STARTED", "Billing Started"),
        GencRegularized => ("GENC_REGULARIZED", "GenC Regularized"),
        ReleasedResigned => ("RELEASED_RESIGNED", "Released/Resigned"),
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Idle
    }
}

labeled_enum! {
    /// Work location of a GenC.
    pub enum Location {
        Mumbai => ("MUMBAI", "Mumbai"),
        Delhi => ("DELHI", "Delhi"),
        Bangalore => ("BANGALORE", "Bangalore"),
        Hyderabad => ("HYDERABAD", "Hyderabad"),
        Chennai => ("CHENNAI", "Chennai"),
        Kolkata => ("KOLKATA", "Kolkata"),
        Pune => ("PUNE", "Pune"),
        Ahmedabad => ("AHMEDABAD", "Ahmedabad"),
        Surat => ("SURAT", "Surat"),
        Jaipur => ("JAIPUR", "Jaipur"),
    }
}

labeled_enum! {
    /// Role held by a GenC. Skill requirements are defined per role.
    pub enum Designation {
        A => ("A", "A"),
        Pa => ("PA", "PA"),
        Pat => ("PAT", "PAT"),
    }
}

labeled_enum! {
    /// Grade of a mentor.
    pub enum MentorDesignation {
        D => ("D", "D"),
        Ad => ("AD", "AD"),
        Sm => ("SM", "SM"),
        M => ("M", "M"),
        Sa => ("SA", "SA"),
        A => ("A", "A"),
    }
}

labeled_enum! {
    /// Kind of application user.
    pub enum UserType {
        PmoMember => ("PMO_MEMBER", "PMO Member"),
        MduMember => ("MDU_MEMBER", "MDU Member"),
        Mentor => ("MENTOR", "Mentor"),
        SlMember => ("SL_MEMBER", "SL Member"),
    }
}

labeled_enum! {
    /// Ordinal skill strength.
    ///
    /// Gap analysis compares [`ProficiencyLevel::rank`], never labels.
    pub enum ProficiencyLevel {
        Beginner => ("BEGINNER", "Beginner"),
        Intermediate => ("INTERMEDIATE", "Intermediate"),
        Advanced => ("ADVANCED", "Advanced"),
        Expert => ("EXPERT", "Expert"),
    }
}

impl ProficiencyLevel {
    /// Ordinal rank, 1 (Beginner) through 4 (Expert).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
        }
    }

    /// True if this level reaches `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_idle() {
        assert_eq!(Status::default(), Status::Idle);
    }

    #[test]
    fn parse_accepts_label_and_key() {
        assert_eq!(
            "Under Project Training".parse::<Status>().ok(),
            Some(Status::UnderProjectTraining)
        );
        assert_eq!(
            "released_resigned".parse::<Status>().ok(),
            Some(Status::ReleasedResigned)
        );
        assert_eq!("pat".parse::<Designation>().ok(), Some(Designation::Pat));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "Benched".parse::<Status>();
        assert!(matches!(
            err,
            Err(GencError::InvalidField {
                field: "Status",
                ..
            })
        ));
    }

    #[test]
    fn proficiency_rank_is_strictly_increasing() {
        let ranks: Vec<u8> = ProficiencyLevel::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(ProficiencyLevel::Expert.satisfies(ProficiencyLevel::Advanced));
        assert!(ProficiencyLevel::Advanced.satisfies(ProficiencyLevel::Advanced));
        assert!(!ProficiencyLevel::Beginner.satisfies(ProficiencyLevel::Intermediate));
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Status::GencRegularized.to_string(), "GenC Regularized");
        assert_eq!(UserType::SlMember.to_string(), "SL Member");
    }
}
