use dioxus::prelude::*;

use crate::components::ui::Card;

#[derive(PartialEq)]
struct Course {
    name: &'static str,
    description: &'static str,
    careers: &'static [&'static str],
}

static INDUSTRIAL: [Course; 4] = [
    Course {
        name: "F1 : Mécanique Générale",
        description: "Cette filière forme des techniciens polyvalents capables de concevoir, fabriquer, et entretenir des ensembles mécaniques. L'accent est mis sur les techniques d'usinage, la construction métallique et la maintenance.",
        careers: &[
            "Technicien de maintenance industrielle",
            "Ajusteur-monteur",
            "Dessinateur-projeteur en mécanique",
            "Opérateur sur machine à commande numérique",
        ],
    },
    Course {
        name: "F3 : Électrotechnique",
        description: "Forme des spécialistes des installations électriques, des automatismes et de la maintenance des équipements. Les élèves apprennent à câbler, dépanner et mettre en service des systèmes complexes.",
        careers: &[
            "Électricien du bâtiment ou industriel",
            "Technicien en automatismes",
            "Agent de maintenance en électrotechnique",
            "Technicien de bureau d'études",
        ],
    },
    Course {
        name: "F4 : Génie Civil",
        description: "Cette filière est axée sur la conception et la réalisation des ouvrages de construction (bâtiments, routes, ponts). Elle couvre le dessin de plans, l'étude des sols, et la conduite de chantiers.",
        careers: &[
            "Dessinateur en bâtiment",
            "Chef de chantier",
            "Technicien de laboratoire BTP",
            "Conducteur de travaux",
        ],
    },
    Course {
        name: "E : Mathématiques et Mécanique",
        description: "Filière d'excellence qui prépare aux études supérieures d'ingénieur. Elle offre une formation théorique poussée en mathématiques et en sciences physiques, avec une application à la mécanique.",
        careers: &[
            "Classes préparatoires aux grandes écoles",
            "Licences scientifiques et techniques",
            "Carrières dans l'ingénierie et la recherche",
        ],
    },
];

static TERTIARY: [Course; 3] = [
    Course {
        name: "G1 : Techniques Administratives",
        description: "Prépare aux métiers du secrétariat et de l'assistanat de direction. La formation inclut la communication professionnelle, l'organisation administrative et l'utilisation des outils bureautiques.",
        careers: &[
            "Secrétaire de direction",
            "Assistant administratif",
            "Agent d'accueil",
            "Gestionnaire de dossiers",
        ],
    },
    Course {
        name: "G2 : Techniques Comptables",
        description: "Forme des techniciens capables de tenir la comptabilité d'une entreprise. Le programme couvre les opérations courantes, la paie, les déclarations fiscales et l'analyse financière.",
        careers: &[
            "Aide-comptable",
            "Comptable en entreprise ou en cabinet",
            "Gestionnaire de paie",
            "Assistant de gestion PME/PMI",
        ],
    },
    Course {
        name: "G3 : Techniques Commerciales",
        description: "Cette filière prépare aux métiers de la vente, du marketing et de la gestion de la relation client. Elle aborde la négociation, la gestion des stocks et les techniques de merchandising.",
        careers: &[
            "Attaché commercial",
            "Vendeur conseil",
            "Assistant marketing",
            "Chef de rayon dans la grande distribution",
        ],
    },
];

#[component]
pub fn Courses() -> Element {
    rsx! {
        div { class: "mx-auto max-w-5xl px-4 py-16",
            div { class: "mx-auto max-w-3xl text-center",
                h1 { class: "text-4xl font-bold text-emerald-900", "Filières de Formation" }
                p { class: "mt-4 text-lg text-gray-600",
                    "Découvrez nos programmes techniques et tertiaires, leurs objectifs et les carrières qu'ils permettent d'envisager."
                }
            }
            CourseGroup { title: "Filières Industrielles", courses: &INDUSTRIAL[..] }
            CourseGroup { title: "Filières Tertiaires", courses: &TERTIARY[..] }
        }
    }
}

#[component]
fn CourseGroup(title: String, courses: &'static [Course]) -> Element {
    rsx! {
        section { class: "mt-14",
            h2 { class: "mb-6 text-2xl font-bold text-emerald-900", "{title}" }
            div { class: "space-y-4",
                for course in courses {
                    Card { key: "{course.name}", class: "p-6",
                        details {
                            summary { class: "cursor-pointer text-lg font-semibold text-emerald-950", "{course.name}" }
                            p { class: "mt-3 text-gray-600", "{course.description}" }
                            p { class: "mt-4 text-sm font-semibold text-amber-700", "Débouchés" }
                            ul { class: "mt-1 list-inside list-disc text-sm text-gray-600",
                                for career in course.careers {
                                    li { key: "{career}", "{career}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
