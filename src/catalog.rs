//! The embedded lesson catalog for both grade levels.
//!
//! The catalog is static configuration: an ordered list of units per grade,
//! each with an optional time-window label and an ordered list of lesson
//! titles. Lesson identifiers are derived from the position of a lesson in
//! the flattened sequence, so the catalog order is load-bearing.

use crate::models::Grade;

/// Published lesson files are numbered from 2, so identifier derivation
/// starts there rather than at 0 or 1.
pub const FIRST_LESSON_INDEX: usize = 2;

/// A curriculum unit: display name, optional schedule label, lesson titles.
#[derive(Debug, Clone, Copy)]
pub struct Unit {
    pub name: &'static str,
    pub when: Option<&'static str>,
    pub lessons: &'static [&'static str],
}

/// One lesson flattened out of the catalog, carrying everything the UI,
/// search index, and progress store need to correlate it.
#[derive(Debug, Clone)]
pub struct CatalogLesson {
    pub id: String,
    pub title: &'static str,
    pub unit_name: &'static str,
    pub unit_index: usize,
    pub href: String,
}

const GRADE7_UNITS: &[Unit] = &[
    Unit {
        name: "Unit 1 — Numbers; Properties of Numbers & Fractions",
        when: Some("Sep–Nov 2025 (9 wks)"),
        lessons: &[
            "Number System Overview (Rational & Irrational Numbers)",
            "Prime Factorization Toolkit (Factors/Multiples • Prime/Composite • Factor Trees • HCF/LCM)",
            "Comparing & Simplifying Rational Numbers",
            "Add/Sub across Rationals",
            "Multiply/Divide across Rationals",
            "Absolute Value of Numbers",
            "Applications & Word Problems",
            "BEDMAS with Rationals",
        ],
    },
    Unit {
        name: "Unit 2 — Expressions (Linear Expressions)",
        when: Some("Nov–Dec 2025 (3 wks)"),
        lessons: &[
            "Rules for Writing Algebraic Expressions",
            "Simplify by Collecting Like Terms",
            "Algebraic Products",
            "Evaluating Algebraic Expressions",
            "Expanding Brackets",
            "Factorizing Expressions",
        ],
    },
    Unit {
        name: "Unit 3 — Equations (Solving Linear Equations)",
        when: Some("Dec 2025 (2 wks)"),
        lessons: &[
            "Solving One‑step Equations",
            "Solving Two‑step Equations",
            "Multi‑step Equations",
        ],
    },
    Unit {
        name: "Unit 4 — Ratios & Proportional Relationships",
        when: Some("Jan–Feb 2026 (2 wks)"),
        lessons: &[
            "Expressing Ratios & Writing Ratios as Fractions",
            "Simplifying & Equivalent Ratios",
            "Problem Solving Using Ratios",
            "Using Ratios to Divide Quantities",
        ],
    },
    Unit {
        name: "Unit 5 — Coordinates (Coordinate Plane)",
        when: Some("Feb–Mar 2026 (3 wks)"),
        lessons: &[
            "Plotting Positive & Negative Coordinates",
            "Plotting Points from a Table of Values",
            "Graphing Straight Lines",
            "Drawing Linear Graphs",
            "Horizontal & Vertical Lines",
            "Drawing Using X, Y Intercepts",
        ],
    },
    Unit {
        name: "Unit 6 — Statistics & Probability — Statistics",
        when: Some("Apr 2026 (3 wks)"),
        lessons: &[
            "Tally & Frequency Tables",
            "Grouping Data",
            "Reading Bar Charts",
            "Drawing Bar Charts",
            "Stem & Leaf Plots",
            "Mode, Median, Mean & Range",
            "Mean from a Frequency Table",
        ],
    },
    Unit {
        name: "Unit 7 — Statistics & Probability — Simple Probability",
        when: Some("May–Jun 2026 (4 wks)"),
        lessons: &[
            "Describing Probability",
            "Assigning Numbers to Probability",
            "Sample Space",
            "Compound Events",
            "Probability Trees",
            "Theoretical Probability",
            "Complementary Events",
        ],
    },
];

const GRADE8_UNITS: &[Unit] = &[
    Unit {
        name: "Unit 1 — The Number System",
        when: None,
        lessons: &[
            "Review of BEDMAS & absolute value",
            "Converting recurring decimals",
            "Rounding numbers",
            "Squares & roots",
            "Operations on fractions",
        ],
    },
    Unit {
        name: "Unit 2 — Geometry of Polygons",
        when: None,
        lessons: &[
            "Angle facts (supplementary, complementary, vertical, adjacent)",
            "Angles in triangles",
            "Isosceles triangle",
            "Angles of quadrilaterals",
            "Algebraic equations in geometry",
            "Parallel lines",
            "Angles in polygons (sum, interior & exterior)",
        ],
    },
    Unit {
        name: "Unit 3 — Transformations & Congruence",
        when: None,
        lessons: &["Translations", "Rotations", "Reflections", "Enlargements"],
    },
    Unit {
        name: "Unit 4 — Statistics",
        when: None,
        lessons: &["Pie charts", "Histograms"],
    },
    Unit {
        name: "Unit 5 — Pythagorean Theorem",
        when: None,
        lessons: &[
            "Find hypotenuse",
            "Find missing sides",
            "Converse of Pythagoras",
            "Problem solving",
        ],
    },
    Unit {
        name: "Unit 6 — Expressions & Equations (Systems)",
        when: None,
        lessons: &[
            "Two- & three-step equations",
            "Solution by elimination",
            "Solution by equating",
            "Solution by substitution",
        ],
    },
    Unit {
        name: "Unit 7 — Geometry Measurement",
        when: None,
        lessons: &[
            "Converting metric units",
            "Parts of a circle",
            "Circumference & area of a circle",
            "Perimeter of polygons",
            "Area of polygons",
            "Composite shapes (area)",
            "Volume of cuboids",
            "Volume of prisms",
            "Volume of a cylinder",
        ],
    },
    Unit {
        name: "Unit 8 — Statistics & Probability (Compound)",
        when: None,
        lessons: &["Simple events with & without replacement"],
    },
    Unit {
        name: "Unit 9 — Constructions (Congruence & Similarity)",
        when: None,
        lessons: &[
            "Construct ASA triangle",
            "Construct SAS triangle",
            "Construct SSS triangle",
        ],
    },
    Unit {
        name: "Unit 10 — Percentages",
        when: None,
        lessons: &[
            "Interchanging number forms",
            "Decimals ⇄ percentages",
            "One quantity as % of another",
            "% increase & decrease",
            "% change",
        ],
    },
];

/// The units for a grade, in curriculum order.
pub fn units(grade: Grade) -> &'static [Unit] {
    match grade {
        Grade::Seven => GRADE7_UNITS,
        Grade::Eight => GRADE8_UNITS,
    }
}

/// Derive the lesson identifier for a flattened sequence index.
pub fn lesson_id(grade: Grade, index: usize) -> String {
    format!("{}-lesson-{}", grade.folder(), index)
}

/// Link target for a flattened sequence index.
pub fn lesson_href(grade: Grade, index: usize) -> String {
    format!("{}/lesson-{}.html", grade.folder(), index)
}

/// Flatten a grade's units into the ordered lesson sequence, assigning
/// identifiers and link targets as we go.
pub fn flatten(grade: Grade) -> Vec<CatalogLesson> {
    let mut out = Vec::new();
    let mut index = FIRST_LESSON_INDEX;

    for (unit_index, unit) in units(grade).iter().enumerate() {
        for title in unit.lessons {
            out.push(CatalogLesson {
                id: lesson_id(grade, index),
                title,
                unit_name: unit.name,
                unit_index,
                href: lesson_href(grade, index),
            });
            index += 1;
        }
    }

    out
}

/// Total lesson count for a grade.
pub fn total_lessons(grade: Grade) -> usize {
    units(grade).iter().map(|u| u.lessons.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_numbering_starts_at_two() {
        let lessons = flatten(Grade::Seven);
        assert_eq!(lessons[0].id, "grade7-lesson-2");
        assert_eq!(lessons[0].href, "grade7/lesson-2.html");
        assert_eq!(lessons[1].id, "grade7-lesson-3");
    }

    #[test]
    fn test_flatten_covers_every_lesson() {
        for grade in [Grade::Seven, Grade::Eight] {
            let lessons = flatten(grade);
            assert_eq!(lessons.len(), total_lessons(grade));
            // Identifiers are unique and sequential
            let last = &lessons[lessons.len() - 1];
            assert_eq!(
                last.id,
                lesson_id(grade, FIRST_LESSON_INDEX + lessons.len() - 1)
            );
        }
    }

    #[test]
    fn test_unit_attribution() {
        let lessons = flatten(Grade::Eight);
        let pie = lessons.iter().find(|l| l.title == "Pie charts").unwrap();
        assert_eq!(pie.unit_name, "Unit 4 — Statistics");
        assert_eq!(pie.unit_index, 3);
    }

    #[test]
    fn test_grade7_has_schedule_labels() {
        assert!(units(Grade::Seven).iter().all(|u| u.when.is_some()));
        assert!(units(Grade::Eight).iter().all(|u| u.when.is_none()));
    }
}
