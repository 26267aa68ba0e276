//! Reviewable import plans: the unit of user approval

use std::collections::HashSet;

use uuid::Uuid;

use super::platforms::platforms_overlap;
use crate::library::{ClassificationTarget, Game};
use crate::sources::ExternalGameRecord;

/// One local game proposed for assignment, with every record matched to it.
/// Checked by default; lives only for the duration of one import run.
#[derive(Debug, Clone)]
pub struct GameCheckbox {
    pub game: Game,
    pub records: Vec<ExternalGameRecord>,
    pub checked: bool,
}

impl GameCheckbox {
    pub fn new(game: Game, records: Vec<ExternalGameRecord>) -> Self {
        Self {
            game,
            records,
            checked: true,
        }
    }

    /// Whether any matched record shares a platform with this game.
    pub fn has_matching_platforms(&self) -> bool {
        self.records
            .iter()
            .any(|record| platforms_overlap(&self.game.platforms, &record.platforms))
    }
}

/// The full proposed operation presented for review.
#[derive(Debug, Clone)]
pub struct GamePropertyImportPlan {
    /// Resolved display name of the property being assigned.
    pub property_name: String,
    pub target: ClassificationTarget,
    /// Label written into appended links.
    pub provider: String,
    /// "Also add a link to the source page" toggle.
    pub add_links: bool,
    /// Proposed matches in stable review order.
    pub entries: Vec<GameCheckbox>,
}

impl GamePropertyImportPlan {
    pub fn check_all(&mut self) {
        for entry in &mut self.entries {
            entry.checked = true;
        }
    }

    pub fn uncheck_all(&mut self) {
        for entry in &mut self.entries {
            entry.checked = false;
        }
    }

    /// Keep only games visible under the host's active filter checked.
    pub fn check_only_visible(&mut self, visible: &HashSet<Uuid>) {
        for entry in &mut self.entries {
            entry.checked = visible.contains(&entry.game.id);
        }
    }

    /// Keep only games whose platforms overlap a matched record checked.
    pub fn check_only_matching_platforms(&mut self) {
        for entry in &mut self.entries {
            entry.checked = entry.has_matching_platforms();
        }
    }

    pub fn checked(&self) -> impl Iterator<Item = &GameCheckbox> {
        self.entries.iter().filter(|entry| entry.checked)
    }

    pub fn checked_count(&self) -> usize {
        self.checked().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::PlatformProperty;

    fn plan_with(entries: Vec<GameCheckbox>) -> GamePropertyImportPlan {
        GamePropertyImportPlan {
            property_name: "Cyberpunk".to_string(),
            target: ClassificationTarget::Tag,
            provider: "MobyGames".to_string(),
            add_links: true,
            entries,
        }
    }

    fn pc_game(name: &str) -> Game {
        let mut game = Game::new(name);
        game.platforms
            .push(PlatformProperty::Spec("pc_windows".to_string()));
        game
    }

    #[test]
    fn toggles_flip_every_entry() {
        let mut plan = plan_with(vec![
            GameCheckbox::new(pc_game("A"), vec![]),
            GameCheckbox::new(pc_game("B"), vec![]),
        ]);
        plan.uncheck_all();
        assert_eq!(plan.checked_count(), 0);
        plan.check_all();
        assert_eq!(plan.checked_count(), 2);
    }

    #[test]
    fn visible_filter_checks_only_listed_games() {
        let a = pc_game("A");
        let b = pc_game("B");
        let a_id = a.id;
        let mut plan = plan_with(vec![
            GameCheckbox::new(a, vec![]),
            GameCheckbox::new(b, vec![]),
        ]);
        plan.check_only_visible(&HashSet::from([a_id]));
        let checked: Vec<_> = plan.checked().map(|e| e.game.id).collect();
        assert_eq!(checked, vec![a_id]);
    }

    #[test]
    fn platform_filter_keeps_overlapping_entries() {
        let mut record = ExternalGameRecord::new("A");
        record
            .platforms
            .push(PlatformProperty::Spec("pc_windows".to_string()));

        let mut plan = plan_with(vec![
            GameCheckbox::new(pc_game("A"), vec![record]),
            GameCheckbox::new(pc_game("B"), vec![ExternalGameRecord::new("B")]),
        ]);
        plan.check_only_matching_platforms();
        let checked: Vec<_> = plan.checked().map(|e| e.game.name.clone()).collect();
        assert_eq!(checked, vec!["A".to_string()]);
    }
}
