//! Deterministic coaching-message assembly.
//!
//! Pure formatting layer over the cluster/rule output. Variant selection is
//! seed-derived from the inputs, so identical arguments always produce a
//! byte-identical message. Message copy is the product's Turkish
//! (ASCII-folded) coaching voice.

use crate::types::ClusterRule;

/// Inputs to [`build_coach_message`]. Absent numeric arguments contribute 0
/// to the variant seed.
#[derive(Debug, Clone, Copy)]
pub struct CoachInput<'a> {
    pub cluster_id: u32,
    pub rule: &'a ClusterRule,
    pub steps: f64,
    pub avg_hr: f64,
    pub age: Option<f64>,
    pub weight: Option<f64>,
    /// Personalized bpm bounds when the user's age is known
    pub zone_bpm_range: Option<[u32; 2]>,
    /// Dynamic step target; falls back to the rule's target when absent
    pub target_steps: Option<f64>,
}

/// Pick a phrasing variant by seed. Stable for a given seed.
fn pick_stable<'a>(variants: &[&'a str], seed: f64) -> &'a str {
    if variants.is_empty() {
        return "";
    }
    let idx = (seed.floor().abs() as usize) % variants.len();
    variants[idx]
}

fn pct_label(zone_pct: [f64; 2]) -> String {
    format!(
        "{}-{}% max HR",
        (zone_pct[0] * 100.0).round(),
        (zone_pct[1] * 100.0).round()
    )
}

fn bpm_label(range: [u32; 2]) -> String {
    format!("{}-{} bpm", range[0], range[1])
}

/// Assemble the coaching message: intro + action + heart-rate-zone sentence
/// (+ cue sentence when a weight is supplied). The weight-based recovery
/// sentence is appended before truncation and the output is capped at 4
/// segments with weight, 3 without — byte-compatible with the shipped
/// behavior the mobile clients snapshot-test against.
pub fn build_coach_message(input: &CoachInput<'_>) -> String {
    let rule = input.rule;
    let seed = input.steps
        + input.avg_hr
        + input.age.unwrap_or(0.0)
        + input.weight.unwrap_or(0.0)
        + f64::from(input.cluster_id) * 13.0;

    let resolved_target = match input.target_steps {
        Some(t) if t.is_finite() => t,
        _ => rule.target_steps,
    };

    let title = rule.title.to_lowercase();
    let intros = [
        format!("Bugun {title} modundasin, net hedef koyuyoruz."),
        format!("Sinyallerin {title} grubuna yakin, net bir plan ciziyoruz."),
        format!("Veriler {title} seviyesinde, hedefi netlestiriyoruz."),
    ];
    let actions = [
        format!("Gunluk hedefin {resolved_target} adim; tempoyu hafta hafta kademeli arttir."),
        format!("Hedef {resolved_target} adim, duzenli kisa seanslarla istikrar kur."),
        format!("Hedef {resolved_target} adim, bugun odagin ritmi bozmadan surdurmek."),
    ];
    let zone_text = match input.zone_bpm_range {
        Some(range) => format!(
            "Nabiz yogunlugu {} bandinda, yaklasik {} araliginda kalsin.",
            pct_label(rule.zone_pct),
            bpm_label(range)
        ),
        None => format!(
            "Nabiz yogunlugu {} bandinda kalsin; aralik kisiye gore degisir.",
            pct_label(rule.zone_pct)
        ),
    };
    let cues = [
        "Nabzi stabil tut, son 5-10 dakikada hizlanip sonra sogumaya gec.",
        "Duzgun nefes ve durusla ritmi koru, tempo dalgalanmasin.",
        "Ritmi koruyup adim kalitesine odaklan, acele etme.",
    ];

    let weight_text = input
        .weight
        .filter(|w| w.is_finite() && *w > 0.0)
        .map(|w| format!("Kilo {w} kg; beslenme, uyku ve suyla toparlanmayi destekle."));

    let intro_refs: Vec<&str> = intros.iter().map(String::as_str).collect();
    let action_refs: Vec<&str> = actions.iter().map(String::as_str).collect();

    let mut parts: Vec<String> = vec![
        pick_stable(&intro_refs, seed).to_string(),
        pick_stable(&action_refs, seed + 1.0).to_string(),
        zone_text,
        pick_stable(&cues, seed + 2.0).to_string(),
    ];
    let cap = if weight_text.is_some() { 4 } else { 3 };
    if let Some(w) = weight_text {
        parts.push(w);
    }
    parts.truncate(cap);

    parts.join(" ")
}
