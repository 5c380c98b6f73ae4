//! Reduces a target's probe outcomes to a [`Status`].

use undead_common::target::{ProbeKind, Status, Target};

/// Classifies one target from the outcomes of the `requested` probes only.
///
/// Any success wins. With no outcome at all (nothing could run) the target is unknown.
/// Otherwise every requested probe failed or crashed, and the target is dead.
pub fn classify(target: &Target, requested: &[ProbeKind]) -> Status {
    if target.address.is_none() {
        return Status::Unknown;
    }

    let mut ran_any: bool = false;
    for kind in requested {
        match target.outcome(*kind) {
            Some(outcome) if outcome.is_success() => return Status::Undead,
            Some(_) => ran_any = true,
            None => {}
        }
    }

    if ran_any { Status::Dead } else { Status::Unknown }
}

/// Classifies `target` and stores the verdict on it.
pub fn apply(target: &mut Target, requested: &[ProbeKind]) -> Status {
    let status: Status = classify(target, requested);
    target.status = Some(status);
    status
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
