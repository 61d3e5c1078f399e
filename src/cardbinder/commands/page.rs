use crate::binder::{Binder, PageTarget};
use crate::commands::{CmdResult, Commit, PageView};
use crate::error::Result;

/// Navigates. Saved, but never a history entry.
pub fn run(binder: &mut Binder, target: PageTarget) -> Result<CmdResult> {
    let layout = binder.require_layout()?;
    let before = binder.current_page();
    binder.go_to_page(target);

    let commit = if binder.current_page() == before {
        Commit::None
    } else {
        Commit::Save
    };
    Ok(CmdResult::default()
        .with_commit(commit)
        .with_page(PageView::of(binder, layout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    #[test]
    fn navigation_saves_without_checkpoint() {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(2).unwrap());
        binder.add_page().unwrap();

        let result = run(&mut binder, PageTarget::Next).unwrap();
        assert_eq!(result.commit, Commit::Save);
        assert_eq!(result.page.unwrap().page, 2);

        let result = run(&mut binder, PageTarget::Next).unwrap();
        assert_eq!(result.commit, Commit::None);
    }
}
