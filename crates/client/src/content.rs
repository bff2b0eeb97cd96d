//! Typed views of the records the pages display, with the built-in content
//! shown while the database has none.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use ltdk_shared::{Record, Timestamp};

fn text(record: &Record, field: &str) -> Option<String> {
    record
        .str_field(field)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

// --- Home ---

#[derive(Debug, Clone, PartialEq)]
pub struct Official {
    pub name: String,
    pub role: String,
    pub message: String,
    pub photo_url: Option<String>,
}

impl Official {
    /// The headmaster as stored, with each missing field taken from the default.
    pub fn headmaster(record: Option<&Record>) -> Self {
        let fallback = |field: &str, default: &str| {
            record
                .and_then(|r| text(r, field))
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            name: fallback("name", "M. Noungo Oumarou"),
            role: fallback("role", "Proviseur du LTDK"),
            message: fallback(
                "message",
                "\"C'est avec une immense fierté que je vous accueille sur le site de notre prestigieux établissement. \
                 Le LTDK est plus qu'une école, c'est une famille unie par l'excellence, la discipline et la solidarité. \
                 Nous formons aujourd'hui les leaders techniques de demain. Rejoignez-nous dans cette belle aventure.\"",
            ),
            photo_url: record.and_then(|r| text(r, "photoURL")),
        }
    }

    pub fn initials(&self) -> String {
        self.name.chars().take(2).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub association: String,
    pub author_name: Option<String>,
    pub author_photo_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<Timestamp>,
}

impl Post {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: text(record, "title").unwrap_or_default(),
            content: text(record, "content").unwrap_or_default(),
            association: record.str_field("association").unwrap_or_default().to_string(),
            author_name: text(record, "authorName"),
            author_photo_url: text(record, "authorPhotoURL"),
            image_url: text(record, "imageURL"),
            created_at: record.timestamp_field("createdAt"),
        }
    }

    fn sample(id: &str, title: &str, content: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            association: String::new(),
            author_name: None,
            author_photo_url: None,
            image_url: None,
            created_at: Some(Timestamp::from_datetime(created_at)),
        }
    }
}

fn at_ten(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// News shown on the home page until general posts exist.
pub fn default_news() -> Vec<Post> {
    vec![
        Post::sample(
            "1",
            "Concours national d'innovation",
            "Nos élèves remportent le premier prix avec leur projet de drone agricole.",
            at_ten(2024, 5, 15),
        ),
        Post::sample(
            "2",
            "Visite du Ministre de l'Éducation",
            "Le ministre a salué l'excellence de nos infrastructures et formations.",
            at_ten(2024, 5, 2),
        ),
        Post::sample(
            "3",
            "Journée portes ouvertes",
            "Un grand succès avec plus de 500 visiteurs découvrant le lycée.",
            at_ten(2024, 4, 20),
        ),
    ]
}

/// Posts to list: the live ones once there are any, otherwise `fallback`.
pub fn posts_or(records: &[Record], fallback: impl FnOnce() -> Vec<Post>) -> Vec<Post> {
    if records.is_empty() {
        fallback()
    } else {
        records.iter().map(Post::from_record).collect()
    }
}

// --- Alumni ---

/// Shown in the association feed until the association publishes.
pub fn example_amicale_post() -> Post {
    Post {
        id: "example-1".to_string(),
        title: "Lancement du programme de mentorat 2024".to_string(),
        content: "L'Amicale a le plaisir d'annoncer le lancement officiel de son programme de mentorat annuel. \
                  Les anciens élèves expérimentés sont invités à s'inscrire pour guider la nouvelle génération. \
                  Les élèves actuels et jeunes diplômés peuvent également postuler pour trouver un mentor."
            .to_string(),
        association: "amicale".to_string(),
        author_name: Some("Bureau de l'Amicale".to_string()),
        author_photo_url: None,
        image_url: None,
        created_at: Some(Timestamp::now()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alumnus {
    pub id: String,
    pub name: String,
    pub promotion: String,
    pub testimonial: String,
    pub photo_url: Option<String>,
}

impl Alumnus {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: text(record, "name").unwrap_or_default(),
            promotion: text(record, "promotion").unwrap_or_default(),
            testimonial: text(record, "testimonial").unwrap_or_default(),
            photo_url: text(record, "photoURL"),
        }
    }

    fn sample(id: &str, name: &str, promotion: &str, testimonial: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            promotion: promotion.to_string(),
            testimonial: testimonial.to_string(),
            photo_url: None,
        }
    }
}

pub fn alumni_or_examples(records: &[Record]) -> Vec<Alumnus> {
    if !records.is_empty() {
        return records.iter().map(Alumnus::from_record).collect();
    }
    vec![
        Alumnus::sample(
            "1",
            "Aïchatou Ibrahim",
            "2005 - Génie Civil",
            "Le LTDK m'a donné les bases solides pour devenir l'ingénieure que je suis aujourd'hui.",
        ),
        Alumnus::sample(
            "2",
            "Moussa Hamidou",
            "2008 - Électrotechnique",
            "Une formation d'excellence qui ouvre les portes des plus grandes entreprises.",
        ),
        Alumnus::sample(
            "3",
            "Fatima Saley",
            "2012 - Comptabilité",
            "Les valeurs de rigueur et de discipline apprises ici me servent chaque jour.",
        ),
    ]
}

// --- School ---

/// The live records once there are any, otherwise the built-in ones.
fn or_defaults<T>(records: &[Record], parse: fn(&Record) -> T, defaults: impl FnOnce() -> Vec<T>) -> Vec<T> {
    if records.is_empty() {
        defaults()
    } else {
        records.iter().map(parse).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl StaffMember {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: text(record, "name").unwrap_or_default(),
            role: text(record, "role").unwrap_or_default(),
        }
    }
}

pub fn administration_or_defaults(records: &[Record]) -> Vec<StaffMember> {
    or_defaults(records, StaffMember::from_record, || {
        [
            ("Proviseur", "M. Noungo Oumarou"),
            ("Censeur", "M. Abdoul Azizou"),
            ("Surveillant Général", "M. Hamidou"),
            ("Chef des travaux", "M. Issa Oumarou"),
        ]
        .iter()
        .enumerate()
        .map(|(i, (role, name))| StaffMember {
            id: (i + 1).to_string(),
            name: name.to_string(),
            role: role.to_string(),
        })
        .collect()
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchoolStat {
    pub id: String,
    pub value: String,
    pub label: String,
}

impl SchoolStat {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            value: text(record, "value").unwrap_or_default(),
            label: text(record, "label").unwrap_or_default(),
        }
    }
}

pub fn stats_or_defaults(records: &[Record]) -> Vec<SchoolStat> {
    or_defaults(records, SchoolStat::from_record, || {
        [
            ("2500+", "Élèves et étudiants"),
            ("150+", "Enseignants et personnel"),
            ("20+", "Ateliers et laboratoires"),
        ]
        .iter()
        .enumerate()
        .map(|(i, (value, label))| SchoolStat {
            id: (i + 1).to_string(),
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
}

impl Facility {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: text(record, "title").unwrap_or_default(),
            image_url: text(record, "imageUrl"),
        }
    }
}

pub fn infrastructure_or_defaults(records: &[Record]) -> Vec<Facility> {
    or_defaults(records, Facility::from_record, || {
        vec![
            Facility {
                id: "1".to_string(),
                title: "Ateliers Modernes".to_string(),
                image_url: None,
            },
            Facility {
                id: "2".to_string(),
                title: "Laboratoires Équipés".to_string(),
                image_url: None,
            },
        ]
    })
}

/// Text of the first history section, or the built-in history.
pub fn school_history(records: &[Record]) -> String {
    records.first().and_then(|r| text(r, "content")).unwrap_or_else(|| {
        "Fondé en 1967, le Lycée Technique Dan Kassawa de Maradi (LTDK) fut un acte stratégique de l'État \
         nigérien post-indépendance pour construire son autonomie en cadres techniques. Le lycée a été conçu \
         pour former des techniciens et cadres intermédiaires afin de soutenir l'industrialisation et le \
         développement du pays, jouant un rôle pilier dans la souveraineté technique nigérienne."
            .to_string()
    })
}

// --- Library ---

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryDocument {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub category: String,
    pub doc_type: Option<String>,
    pub year: Option<i64>,
    pub series: Option<String>,
    pub file_url: String,
}

impl LibraryDocument {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: text(record, "title").unwrap_or_default(),
            subject: text(record, "subject").unwrap_or_default(),
            category: record.str_field("category").unwrap_or_default().to_string(),
            doc_type: text(record, "type"),
            year: record.get("year").and_then(|v| v.as_f64()).map(|y| y as i64),
            series: text(record, "series"),
            file_url: text(record, "fileURL").unwrap_or_default(),
        }
    }

    fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        keyword.is_empty()
            || self.title.to_lowercase().contains(&keyword)
            || self.subject.to_lowercase().contains(&keyword)
    }
}

/// Value of a select filter that matches everything.
pub const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub struct ExamSearch {
    pub keyword: String,
    pub year: String,
    pub series: String,
}

impl Default for ExamSearch {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            year: ALL.to_string(),
            series: ALL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocSearch {
    pub keyword: String,
    pub doc_type: String,
}

impl Default for DocSearch {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            doc_type: ALL.to_string(),
        }
    }
}

pub fn exam_subjects(docs: &[LibraryDocument], search: &ExamSearch) -> Vec<LibraryDocument> {
    docs.iter()
        .filter(|d| d.category == "sujet_bac")
        .filter(|d| d.matches_keyword(&search.keyword))
        .filter(|d| search.year == ALL || d.year.map(|y| y.to_string()).as_deref() == Some(search.year.as_str()))
        .filter(|d| search.series == ALL || d.series.as_deref() == Some(search.series.as_str()))
        .cloned()
        .collect()
}

pub fn other_documents(docs: &[LibraryDocument], search: &DocSearch) -> Vec<LibraryDocument> {
    docs.iter()
        .filter(|d| d.category == "autre_document")
        .filter(|d| d.matches_keyword(&search.keyword))
        .filter(|d| search.doc_type == ALL || d.doc_type.as_deref() == Some(search.doc_type.as_str()))
        .cloned()
        .collect()
}

/// Exam years on offer, newest first.
pub fn exam_years(docs: &[LibraryDocument]) -> Vec<i64> {
    let mut years: Vec<i64> = docs
        .iter()
        .filter(|d| d.category == "sujet_bac")
        .filter_map(|d| d.year)
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

pub fn exam_series(docs: &[LibraryDocument]) -> Vec<String> {
    let mut series: Vec<String> = docs
        .iter()
        .filter(|d| d.category == "sujet_bac")
        .filter_map(|d| d.series.clone())
        .collect();
    series.sort();
    series.dedup();
    series
}

pub fn document_types(docs: &[LibraryDocument]) -> Vec<String> {
    let mut types: Vec<String> = docs
        .iter()
        .filter(|d| d.category == "autre_document")
        .filter_map(|d| d.doc_type.clone())
        .collect();
    types.sort();
    types.dedup();
    types
}

// --- Contact ---

#[derive(Debug, Clone, PartialEq)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub maps_embed_url: Option<String>,
}

impl ContactInfo {
    /// The stored document, or the built-in details when there is none.
    pub fn from_record(record: Option<&Record>) -> Self {
        match record {
            Some(record) => Self {
                address: text(record, "address").unwrap_or_default(),
                phone: text(record, "phone").unwrap_or_default(),
                email: text(record, "email").unwrap_or_default(),
                maps_embed_url: text(record, "googleMapsEmbedUrl"),
            },
            None => Self {
                address: "Lycée Technique Dan Kassawa, BP 123, Maradi, Niger".to_string(),
                phone: "+227 20 00 00 00".to_string(),
                email: "contact@ltdk-maradi.ne".to_string(),
                maps_embed_url: None,
            },
        }
    }
}

// --- Dates ---

const MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre", "octobre", "novembre",
    "décembre",
];

/// "15 mai 2024"
pub fn format_day(ts: Timestamp) -> String {
    match ts.to_datetime() {
        Some(dt) => format!("{} {} {}", dt.day(), MONTHS[dt.month0() as usize], dt.year()),
        None => String::new(),
    }
}

/// "il y a 3 jours", relative to `now`.
pub fn time_ago(ts: Timestamp, now: DateTime<Utc>) -> String {
    let Some(then) = ts.to_datetime() else {
        return String::new();
    };
    let elapsed = now.signed_duration_since(then);
    let (amount, unit) = if elapsed.num_minutes() < 1 {
        return "à l'instant".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "heure")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "jour")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "mois")
    } else {
        (elapsed.num_days() / 365, "an")
    };
    let plural = if amount > 1 && !unit.ends_with('s') { "s" } else { "" };
    format!("il y a {amount} {unit}{plural}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltdk_shared::Fields;
    use serde_json::json;

    fn record(id: &str, value: serde_json::Value) -> Record {
        let fields: Fields = value.as_object().cloned().unwrap_or_default();
        Record::new(id, fields)
    }

    #[test]
    fn headmaster_fills_missing_fields_from_defaults() {
        let stored = record("headmaster", json!({ "name": "Mme Hadiza Abdou", "role": "" }));
        let official = Official::headmaster(Some(&stored));
        assert_eq!(official.name, "Mme Hadiza Abdou");
        assert_eq!(official.role, "Proviseur du LTDK");
        assert!(official.message.contains("immense fierté"));
        assert_eq!(Official::headmaster(None).initials(), "M.");
    }

    #[test]
    fn school_sections_fall_back_until_stored() {
        assert_eq!(administration_or_defaults(&[]).len(), 4);
        assert_eq!(administration_or_defaults(&[])[0].role, "Proviseur");
        assert_eq!(stats_or_defaults(&[]).len(), 3);
        assert!(school_history(&[]).starts_with("Fondé en 1967"));

        let staff = [record("censeur", json!({ "name": "Mme Zara Moussa", "role": "Censeur", "type": "administration" }))];
        assert_eq!(
            administration_or_defaults(&staff),
            vec![StaffMember {
                id: "censeur".into(),
                name: "Mme Zara Moussa".into(),
                role: "Censeur".into()
            }]
        );
        let history = [record("h", json!({ "section": "history", "content": "Depuis 1967." }))];
        assert_eq!(school_history(&history), "Depuis 1967.");
        let infra = [record("i", json!({ "title": "Atelier bois", "imageUrl": "https://img.example/bois.jpg" }))];
        assert_eq!(
            infrastructure_or_defaults(&infra)[0].image_url.as_deref(),
            Some("https://img.example/bois.jpg")
        );
    }

    #[test]
    fn live_posts_replace_defaults() {
        assert_eq!(posts_or(&[], default_news).len(), 3);
        let live = [record("p1", json!({ "title": "Rentrée 2025", "association": "" }))];
        let posts = posts_or(&live, default_news);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Rentrée 2025");
    }

    #[test]
    fn default_news_dates_render_in_french() {
        let news = default_news();
        assert_eq!(format_day(news[0].created_at.unwrap()), "15 mai 2024");
        assert_eq!(format_day(news[2].created_at.unwrap()), "20 avril 2024");
    }

    #[test]
    fn relative_dates() {
        let now = at_ten(2024, 6, 1);
        let ts = |dt: DateTime<Utc>| Timestamp::from_datetime(dt);
        assert_eq!(time_ago(ts(now), now), "à l'instant");
        assert_eq!(time_ago(ts(at_ten(2024, 5, 29)), now), "il y a 3 jours");
        assert_eq!(time_ago(ts(at_ten(2024, 1, 1)), now), "il y a 5 mois");
        assert_eq!(time_ago(ts(at_ten(2023, 5, 1)), now), "il y a 1 an");
    }

    fn library() -> Vec<LibraryDocument> {
        [
            record("a", json!({ "title": "Bac 2021 Maths", "subject": "Mathématiques", "category": "sujet_bac", "year": 2021, "series": "F3", "fileURL": "u" })),
            record("b", json!({ "title": "Bac 2019 Physique", "subject": "Physique", "category": "sujet_bac", "year": 2019, "series": "F4", "fileURL": "u" })),
            record("c", json!({ "title": "Bac 2021 Compta", "subject": "Comptabilité", "category": "sujet_bac", "year": 2021, "series": "G2", "fileURL": "u" })),
            record("d", json!({ "title": "Cours d'électricité", "subject": "Électrotechnique", "category": "autre_document", "type": "cours", "fileURL": "u" })),
            record("e", json!({ "title": "TD de mécanique", "subject": "Mécanique", "category": "autre_document", "type": "td", "fileURL": "u" })),
        ]
        .iter()
        .map(LibraryDocument::from_record)
        .collect()
    }

    #[test]
    fn exam_filters_combine() {
        let docs = library();
        assert_eq!(exam_subjects(&docs, &ExamSearch::default()).len(), 3);

        let search = ExamSearch {
            year: "2021".into(),
            ..ExamSearch::default()
        };
        let ids: Vec<_> = exam_subjects(&docs, &search).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let search = ExamSearch {
            keyword: "compta".into(),
            year: "2021".into(),
            series: ALL.into(),
        };
        let ids: Vec<_> = exam_subjects(&docs, &search).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn other_documents_filter_by_type() {
        let docs = library();
        let search = DocSearch {
            keyword: String::new(),
            doc_type: "td".into(),
        };
        let ids: Vec<_> = other_documents(&docs, &search).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["e"]);
    }

    #[test]
    fn filter_options_are_sorted_and_unique() {
        let docs = library();
        assert_eq!(exam_years(&docs), vec![2021, 2019]);
        assert_eq!(exam_series(&docs), vec!["F3", "F4", "G2"]);
        assert_eq!(document_types(&docs), vec!["cours", "td"]);
    }

    #[test]
    fn contact_defaults_only_without_a_document() {
        assert_eq!(ContactInfo::from_record(None).email, "contact@ltdk-maradi.ne");
        let stored = record("main", json!({ "phone": "+227 20 41 00 00" }));
        let info = ContactInfo::from_record(Some(&stored));
        assert_eq!(info.phone, "+227 20 41 00 00");
        assert_eq!(info.email, "");
    }
}
