/*!
 * Write-back: patch target markers in the tree from the model and serialize.
 *
 * Writing happens in two phases. Every fragment is first resolved to a node
 * and its replacement markup is parsed; any failure is collected and the tree
 * is left untouched. Only when everything resolved are the nodes replaced.
 */

use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::index::NodeAddress;
use crate::document::loader;
use crate::document::model::{Document, FragmentContent};
use crate::dom::{Dom, NodeId};
use crate::errors::{XliffError, XliffResult};

// @const: Declaration emitted when the input had none
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// One resolved replacement
#[derive(Debug)]
enum Patch {
    /// Replace a whole marker and set its tail
    Marker { node: NodeId, replacement: Dom, tail: String },
    /// Replace one placeholder inside an untouched marker
    Placeholder { node: NodeId, replacement: Dom },
}

impl Document {
    /// Patch the tree from the model and write it to `destination`, or back
    /// to the file it was loaded from
    pub fn write(&mut self, destination: Option<&Path>) -> XliffResult<PathBuf> {
        let patched = self.apply_to_tree()?;
        let output = destination
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.path.clone());

        fs::write(&output, self.to_xml_string()).map_err(|source| XliffError::Io {
            path: output.clone(),
            source,
        })?;
        info!("Wrote {} ({} node(s) replaced)", output.display(), patched);
        Ok(output)
    }

    /// Patch the in-memory tree from the model without touching disk.
    ///
    /// Returns the number of replaced nodes. On error nothing is modified.
    pub fn apply_to_tree(&mut self) -> XliffResult<usize> {
        let patches = self.plan_patches()?;
        let count = patches.len();

        for patch in patches {
            match patch {
                Patch::Marker { node, replacement, tail } => {
                    self.dom.replace_element(node, &replacement)?;
                    self.dom.set_tail(node, &tail);
                }
                Patch::Placeholder { node, replacement } => {
                    self.dom.replace_element(node, &replacement)?;
                }
            }
        }

        // Replaced markers may have dropped or gained placeholders
        self.index = loader::build_index(&self.dom, &self.options);
        Ok(count)
    }

    /// Serialize the tree, adding an XML declaration when the input had none
    pub fn to_xml_string(&self) -> String {
        let body = self.dom.to_xml_string();
        if self.dom.has_declaration() {
            return body;
        }
        match body.strip_prefix('\u{feff}') {
            Some(rest) => format!("\u{feff}{}{}", XML_DECLARATION, rest),
            None => format!("{}{}", XML_DECLARATION, body),
        }
    }

    fn plan_patches(&self) -> XliffResult<Vec<Patch>> {
        let mut patches = Vec::new();
        let mut failures = Vec::new();

        for file in &self.files {
            for unit in &file.trans_units {
                let mut seen_mids = HashSet::new();
                for fragment in &unit.target_fragments {
                    let address = NodeAddress::marker(file.original.as_str(), unit.id.as_str(), fragment.mid.as_str());
                    if !seen_mids.insert(fragment.mid.as_str()) {
                        failures.push(XliffError::StructuralMismatch {
                            address,
                            reason: "marker id appears more than once in the model".to_string(),
                        });
                        continue;
                    }

                    match &fragment.content {
                        FragmentContent::Text(_) => {
                            match self.resolve(&address, &fragment.to_markup()) {
                                Ok((node, replacement)) => patches.push(Patch::Marker {
                                    node,
                                    replacement,
                                    tail: fragment.tail.clone(),
                                }),
                                Err(e) => failures.push(e),
                            }
                        }
                        FragmentContent::Placeholders(placeholders) => {
                            if self.index.get(&address).is_none() {
                                failures.push(XliffError::NodeNotFound(address));
                                continue;
                            }
                            let mut seen_ids = HashSet::new();
                            for placeholder in placeholders {
                                let address = address.with_placeholder(placeholder.id.as_str());
                                if !seen_ids.insert(placeholder.id.as_str()) {
                                    failures.push(XliffError::StructuralMismatch {
                                        address,
                                        reason: "placeholder id appears more than once in the marker".to_string(),
                                    });
                                    continue;
                                }
                                match self.resolve(&address, &placeholder.to_markup()) {
                                    Ok((node, replacement)) => patches.push(Patch::Placeholder { node, replacement }),
                                    Err(e) => failures.push(e),
                                }
                            }
                        }
                    }
                }
            }
        }

        if !failures.is_empty() {
            debug!("{} fragment(s) failed to resolve; tree left untouched", failures.len());
            return Err(XliffError::WriteFailed(failures));
        }
        Ok(patches)
    }

    /// Find the node for `address` and parse the markup that replaces it
    fn resolve(&self, address: &NodeAddress, markup: &str) -> XliffResult<(NodeId, Dom)> {
        let node = self
            .index
            .get(address)
            .ok_or_else(|| XliffError::NodeNotFound(address.clone()))?;

        let namespace = self
            .dom
            .element(node)
            .and_then(|element| element.namespace.as_deref());
        let replacement = Dom::parse_fragment(markup, namespace).map_err(|e| {
            XliffError::StructuralMismatch {
                address: address.clone(),
                reason: format!("replacement markup is not well-formed: {}", e),
            }
        })?;
        Ok((node, replacement))
    }
}
