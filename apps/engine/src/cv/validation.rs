//! Golden-rule validation and advisory confidence scores for the hybrid form.

use serde::{Deserialize, Serialize};

use crate::cv::hybrid::{sanitize_hybrid_cv_form, HybridCvForm};

/// Per-section completeness, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridConfidence {
    pub personal_info: u8,
    pub summary: u8,
    pub experience: u8,
    pub education: u8,
    pub hard_skills: u8,
    pub soft_skills: u8,
    pub languages: u8,
    pub certifications: u8,
    pub volunteering: u8,
    pub interests: u8,
    /// Unweighted mean of the ten section scores.
    pub global: u8,
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Lists every required field that is still empty, in French, most blocking first.
///
/// An empty list means the golden rule holds and generation may proceed.
pub fn hybrid_validation_issues(input: &HybridCvForm) -> Vec<String> {
    let safe = sanitize_hybrid_cv_form(input);
    let mut issues = Vec::new();

    if safe.personal_info.full_name.is_empty() {
        issues.push("Nom complet manquant.".to_string());
    }
    if safe.personal_info.email.is_empty() {
        issues.push("Email manquant.".to_string());
    }
    if safe.personal_info.phone.is_empty() {
        issues.push("Téléphone manquant.".to_string());
    }
    if safe.experience.is_empty() {
        issues.push("Ajoute au moins une expérience.".to_string());
    }

    for (index, item) in safe.experience.iter().enumerate() {
        let rank = index + 1;
        if item.job_title.is_empty() {
            issues.push(format!("Expérience {rank}: Nom du poste manquant."));
        }
        if item.company.is_empty() {
            issues.push(format!("Expérience {rank}: Entreprise manquante."));
        }
        if item.location.is_empty() {
            issues.push(format!("Expérience {rank}: Lieu manquant."));
        }
        if item.start_date.is_empty() && item.end_date.is_empty() {
            issues.push(format!("Expérience {rank}: Dates manquantes."));
        }
        if item.achievements.is_empty() {
            issues.push(format!("Expérience {rank}: Missions manquantes."));
        }
    }

    issues
}

fn presence(filled: bool, present: f64, absent: f64) -> u8 {
    to_score(if filled { present } else { absent })
}

fn skill_score(count: usize) -> u8 {
    if count == 0 {
        return 25;
    }
    to_score((35.0 + count as f64 * 7.0).min(100.0))
}

pub fn compute_hybrid_confidence(input: &HybridCvForm) -> HybridConfidence {
    let safe = sanitize_hybrid_cv_form(input);
    let info = &safe.personal_info;

    let personal_fields = [
        &info.full_name,
        &info.city,
        &info.phone,
        &info.email,
        &info.linkedin,
    ];
    let filled = personal_fields.iter().filter(|field| !field.is_empty()).count();
    let personal_info = to_score(filled as f64 / personal_fields.len() as f64 * 100.0);

    let experience = if safe.experience.is_empty() {
        20
    } else {
        let total: f64 = safe
            .experience
            .iter()
            .map(|item| {
                let required = [
                    !item.job_title.is_empty(),
                    !item.company.is_empty(),
                    !item.location.is_empty(),
                    !item.start_date.is_empty() || !item.end_date.is_empty(),
                ];
                let base = required.iter().filter(|ok| **ok).count() as f64 / required.len() as f64;
                let boost = if item.achievements.is_empty() { 0.0 } else { 0.2 };
                (base + boost).min(1.0) * 100.0
            })
            .sum();
        to_score(total / safe.experience.len() as f64)
    };

    let mut confidence = HybridConfidence {
        personal_info,
        summary: presence(!safe.summary.is_empty(), 100.0, 20.0),
        experience,
        education: presence(!safe.education.is_empty(), 85.0, 35.0),
        hard_skills: skill_score(safe.hard_skills.len()),
        soft_skills: skill_score(safe.soft_skills.len()),
        languages: presence(!safe.languages.is_empty(), 80.0, 30.0),
        certifications: presence(!safe.certifications.is_empty(), 80.0, 30.0),
        volunteering: presence(!safe.volunteering.is_empty(), 75.0, 25.0),
        interests: presence(!safe.interests.is_empty(), 70.0, 20.0),
        global: 0,
    };

    let scores = [
        confidence.personal_info,
        confidence.summary,
        confidence.experience,
        confidence.education,
        confidence.hard_skills,
        confidence.soft_skills,
        confidence.languages,
        confidence.certifications,
        confidence.volunteering,
        confidence.interests,
    ];
    let sum: u32 = scores.iter().map(|score| u32::from(*score)).sum();
    confidence.global = to_score(f64::from(sum) / scores.len() as f64);
    confidence
}

/// Canned UI hints, gated on confidence thresholds and overlap warnings.
pub fn suggested_improvements(confidence: &HybridConfidence, overlap_warnings: &[String]) -> Vec<String> {
    let mut hints = Vec::new();
    if confidence.summary < 60 {
        hints.push("Compléter le résumé professionnel.".to_string());
    }
    if confidence.experience < 80 {
        hints.push("Ajouter des missions chiffrées par expérience.".to_string());
    }
    if confidence.hard_skills < 70 {
        hints.push("Ajouter davantage de hard skills spécifiques.".to_string());
    }
    if !overlap_warnings.is_empty() {
        hints.push("Vérifier les chevauchements de dates détectés.".to_string());
    }
    hints
}
