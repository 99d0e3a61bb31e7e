use crate::document::Document;
use crate::dom::NodeId;
use crate::error::TreeError;
use crate::tag::Tag;
use crate::toggle::selected_texts;
use crate::tool::Change;

fn is_clearable(tag: &Tag) -> bool {
    tag.inline().is_some_and(|t| t.is_clearable())
}

/// Strips every inline formatting element except links from the selected
/// text, up to each node's enclosing block. Returns `None` when the
/// selection holds no text.
pub fn clear_formatting(doc: &mut Document) -> Result<Option<Change>, TreeError> {
    if doc.split_selection_boundaries()?.is_none() {
        return Ok(None);
    }
    let Some(snapshot) = doc.save_selection()? else {
        return Ok(None);
    };

    let texts = selected_texts(doc);
    if texts.is_empty() {
        doc.restore_selection(&snapshot)?;
        return Ok(None);
    }

    let mut blocks: Vec<NodeId> = Vec::new();
    let mut removed = 0usize;
    for node in &texts {
        let block = doc.enclosing_block(*node);
        if !blocks.contains(&block) {
            blocks.push(block);
        }
        while let Some(element) = doc.find_enclosing(*node, |el| is_clearable(&el.tag)) {
            let tree = doc.tree_mut();
            tree.isolate(*node, element)?;
            tree.unwrap(element)?;
            removed += 1;
        }
    }
    log::debug!("cleared {removed} formatting elements");

    doc.restore_selection(&snapshot)?;
    for block in blocks {
        doc.normalize_formatting(block)?;
    }
    Ok(Some(Change::Cleared { elements: removed }))
}
