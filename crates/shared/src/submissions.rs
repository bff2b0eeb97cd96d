//! The form submissions the site accepts, and where each one is stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Fields;
use crate::store::NewDocument;
use crate::validation::{is_truthy, Check, Schema};

pub const INVALID_DATA: &str = "Données invalides.";
pub const SUBMITTED: &str = "Demande envoyée avec succès.";
pub const FAILED: &str = "Une erreur s'est produite.";

pub const MEMBERSHIP_APPLICATIONS: &str = "membershipApplications";
pub const MENTORSHIP_REQUESTS: &str = "mentorshipRequests";
pub const DOCUMENTS: &str = "documents";

/// Field filled with the backend clock on every submission.
pub const CREATED_AT: &str = "createdAt";

/// Outcome of a submission as reported to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: SUBMITTED.to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Membership,
    Mentor,
    Mentee,
    Document,
}

impl SubmissionKind {
    pub const ALL: [SubmissionKind; 4] = [Self::Membership, Self::Mentor, Self::Mentee, Self::Document];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Mentor => "mentor",
            Self::Mentee => "mentee",
            Self::Document => "document",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    /// Collection the submission is appended to.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Membership => MEMBERSHIP_APPLICATIONS,
            Self::Mentor | Self::Mentee => MENTORSHIP_REQUESTS,
            Self::Document => DOCUMENTS,
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            Self::Membership => Schema::new("membership")
                .field("name", Check::Text { min: 1 }, "Le nom est requis.")
                .field("promotion", Check::Text { min: 1 }, "La promotion est requise.")
                .field("email", Check::Email, "L'email est invalide.")
                .field("phone", Check::Text { min: 1 }, "Le téléphone est requis."),
            Self::Mentor => Schema::new("mentor")
                .field("name", Check::Text { min: 1 }, "Le nom est requis.")
                .field("contact", Check::Text { min: 1 }, "Le contact est requis.")
                .field("promotion", Check::Text { min: 1 }, "La promotion est requise.")
                .field("field", Check::Text { min: 1 }, "Le domaine est requis.")
                .field("motivation", Check::Text { min: 1 }, "La motivation est requise."),
            Self::Mentee => Schema::new("mentee")
                .field("name", Check::Text { min: 1 }, "Le nom est requis.")
                .field("email", Check::Email, "L'email est invalide.")
                .field("promotion", Check::Text { min: 1 }, "La promotion est requise.")
                .field("domain", Check::Text { min: 1 }, "Le domaine est requis.")
                .field("status", Check::OneOf(&["student", "young_alumni"]), "Le statut est invalide.")
                .field("need", Check::Text { min: 1 }, "Le besoin est requis."),
            Self::Document => Schema::new("document")
                .field("title", Check::Text { min: 3 }, "Le titre est requis.")
                .field("subject", Check::Text { min: 2 }, "La matière est requise.")
                .field("fileURL", Check::Text { min: 1 }, "Le fichier est requis.")
                .field(
                    "category",
                    Check::OneOf(&["sujet_bac", "autre_document"]),
                    "La catégorie est invalide.",
                )
                .field(
                    "type",
                    Check::OptionalOneOf(&["cours", "td", "exercice"]),
                    "Le type est invalide.",
                )
                .field("year", Check::OptionalNumber, "L'année est invalide.")
                .field("series", Check::OptionalText, "La série est invalide.")
                .refine(
                    "year",
                    "L'année et la série sont requises pour les sujets de bac.",
                    |f| category(f) != Some("sujet_bac") || (is_truthy(f, "year") && is_truthy(f, "series")),
                )
                .refine(
                    "type",
                    "Le type est requis pour les autres documents.",
                    |f| category(f) != Some("autre_document") || is_truthy(f, "type"),
                ),
        }
    }

    /// Shape validated fields into the stored record.
    pub fn into_write(self, validated: Fields) -> NewDocument {
        let mut fields = Fields::new();
        match self {
            Self::Membership => fields = validated,
            Self::Mentor => {
                fields = validated;
                fields.insert("type".into(), Value::from("mentor"));
            }
            Self::Mentee => {
                fields.insert("type".into(), Value::from("mentee"));
                copy(&validated, &mut fields, "name", "name");
                copy(&validated, &mut fields, "email", "contact");
                copy(&validated, &mut fields, "promotion", "promotion");
                copy(&validated, &mut fields, "domain", "field");
                copy(&validated, &mut fields, "status", "status");
                copy(&validated, &mut fields, "need", "need");
            }
            Self::Document => {
                for key in ["title", "subject", "category", "fileURL"] {
                    copy(&validated, &mut fields, key, key);
                }
                match category(&validated) {
                    Some("sujet_bac") => {
                        copy(&validated, &mut fields, "year", "year");
                        copy(&validated, &mut fields, "series", "series");
                    }
                    Some("autre_document") => copy(&validated, &mut fields, "type", "type"),
                    _ => {}
                }
            }
        }
        fields.remove(CREATED_AT);
        NewDocument::new(fields).with_server_timestamp(CREATED_AT)
    }
}

fn category(fields: &Fields) -> Option<&str> {
    fields.get("category").and_then(|v| v.as_str())
}

fn copy(from: &Fields, to: &mut Fields, source: &str, target: &str) {
    if let Some(value) = from.get(source) {
        to.insert(target.to_string(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_for(kind: SubmissionKind, raw: Value) -> NewDocument {
        let validated = kind.schema().validate(&raw).unwrap();
        kind.into_write(validated)
    }

    #[test]
    fn slugs_round_trip() {
        for kind in SubmissionKind::ALL {
            assert_eq!(SubmissionKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(SubmissionKind::from_slug("newsletter"), None);
    }

    #[test]
    fn mentor_is_tagged() {
        let write = write_for(
            SubmissionKind::Mentor,
            json!({
                "name": "Ibrahim",
                "contact": "+227 90 00 00 00",
                "promotion": "1998",
                "field": "Génie civil",
                "motivation": "Transmettre"
            }),
        );
        assert_eq!(write.fields.get("type"), Some(&json!("mentor")));
        assert_eq!(write.server_timestamps, vec![CREATED_AT.to_string()]);
    }

    #[test]
    fn mentee_is_mapped_onto_request_shape() {
        let write = write_for(
            SubmissionKind::Mentee,
            json!({
                "name": "Zeinabou",
                "email": "z@x.ne",
                "promotion": "2023",
                "domain": "Électrotechnique",
                "status": "student",
                "need": "Orientation"
            }),
        );
        assert_eq!(
            Value::Object(write.fields),
            json!({
                "type": "mentee",
                "name": "Zeinabou",
                "contact": "z@x.ne",
                "promotion": "2023",
                "field": "Électrotechnique",
                "status": "student",
                "need": "Orientation"
            })
        );
    }

    #[test]
    fn mentee_status_must_be_known() {
        let err = SubmissionKind::Mentee
            .schema()
            .validate(&json!({
                "name": "Z",
                "email": "z@x.ne",
                "promotion": "2023",
                "domain": "Électrotechnique",
                "status": "retired",
                "need": "Orientation"
            }))
            .unwrap_err();
        assert!(err.has_error_for("status"));
    }

    #[test]
    fn bac_subject_needs_year_and_series() {
        let err = SubmissionKind::Document
            .schema()
            .validate(&json!({
                "title": "Bac 2021",
                "subject": "Mathématiques",
                "fileURL": "https://files.example/bac.pdf",
                "category": "sujet_bac",
                "year": "2021"
            }))
            .unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(err.has_error_for("year"));
    }

    #[test]
    fn other_document_needs_type() {
        let err = SubmissionKind::Document
            .schema()
            .validate(&json!({
                "title": "Cours",
                "subject": "Physique",
                "fileURL": "https://files.example/cours.pdf",
                "category": "autre_document"
            }))
            .unwrap_err();
        assert!(err.has_error_for("type"));
    }

    #[test]
    fn document_write_keeps_category_specific_fields_only() {
        let write = write_for(
            SubmissionKind::Document,
            json!({
                "title": "Bac 2021",
                "subject": "Mathématiques",
                "fileURL": "https://files.example/bac.pdf",
                "category": "sujet_bac",
                "type": "td",
                "year": "2021",
                "series": "F3"
            }),
        );
        assert_eq!(write.fields.get("year"), Some(&json!(2021)));
        assert_eq!(write.fields.get("series"), Some(&json!("F3")));
        assert!(write.fields.get("type").is_none());
    }

    #[test]
    fn caller_supplied_created_at_is_discarded() {
        let validated = SubmissionKind::Membership
            .schema()
            .validate(&json!({
                "name": "Aïchatou",
                "promotion": "2005",
                "email": "a@x.ne",
                "phone": "+227 96 00 00 00",
                "createdAt": "1999-01-01"
            }))
            .unwrap();
        let write = SubmissionKind::Membership.into_write(validated);
        assert!(write.fields.get(CREATED_AT).is_none());
    }
}
