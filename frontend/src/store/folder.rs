use pigeon_shared::models::{Folder, VirtualFolderCounts};
use std::collections::BTreeSet;
use std::rc::Rc;
use yew::prelude::*;

/// Folder tree, sidebar expansion and the virtual folder counts.
///
/// `version` and `counts_version` are bumped to ask the mail view to refetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderState {
    pub folders: Vec<Folder>,
    pub expanded: BTreeSet<i64>,
    pub counts: VirtualFolderCounts,
    pub version: u32,
    pub counts_version: u32,
}

pub enum FolderAction {
    Loaded(Vec<Folder>),
    CountsLoaded(VirtualFolderCounts),
    ToggleExpanded(i64),
    Reload,
    ReloadCounts,
}

impl Reducible for FolderState {
    type Action = FolderAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut state = (*self).clone();
        match action {
            FolderAction::Loaded(folders) => state.folders = folders,
            FolderAction::CountsLoaded(counts) => state.counts = counts,
            FolderAction::ToggleExpanded(id) => {
                if !state.expanded.remove(&id) {
                    state.expanded.insert(id);
                }
            }
            FolderAction::Reload => state.version = state.version.wrapping_add(1),
            FolderAction::ReloadCounts => {
                state.counts_version = state.counts_version.wrapping_add(1)
            }
        }
        Rc::new(state)
    }
}

/// Pre-order walk of the tree paired with each folder's nesting level.
pub fn flatten_folders(folders: &[Folder]) -> Vec<(usize, &Folder)> {
    fn walk<'a>(folder: &'a Folder, level: usize, out: &mut Vec<(usize, &'a Folder)>) {
        out.push((level, folder));
        for child in &folder.children {
            walk(child, level + 1, out);
        }
    }

    let mut out = Vec::new();
    for folder in folders {
        walk(folder, 0, &mut out);
    }
    out
}
