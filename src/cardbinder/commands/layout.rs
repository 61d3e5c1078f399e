use crate::binder::Binder;
use crate::commands::{CmdResult, PageView};
use crate::error::Result;
use crate::layout::Layout;

pub fn run(binder: &mut Binder, size: i64) -> Result<CmdResult> {
    let layout = Layout::new(size)?;
    binder.select_layout(layout);
    Ok(CmdResult::mutated(format!(
        "Layout set to {} ({} slots)",
        layout,
        binder.slots().len()
    ))
    .with_page(PageView::of(binder, layout)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Commit;
    use crate::error::BinderError;

    #[test]
    fn selects_layout_and_checkpoints() {
        let mut binder = Binder::default();
        let result = run(&mut binder, 4).unwrap();
        assert_eq!(result.commit, Commit::Checkpoint);
        assert_eq!(binder.slots().len(), 16);
        assert_eq!(result.messages[0].content, "Layout set to 4x4 (16 slots)");
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let mut binder = Binder::default();
        assert!(matches!(run(&mut binder, 0), Err(BinderError::InvalidLayout(0))));
        assert!(binder.layout().is_none());
    }
}
