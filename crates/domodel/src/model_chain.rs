//! ModelChain - identifier-addressed edits on a model tree
//!
//! Works on an owned copy of a model before it is run:
//!
//! ```rust,ignore
//! let mut chain = ModelChain::new(&model);
//! chain.after("foo", Model::element("button"))?.prepend(None, Model::element("h1"))?;
//! engine::run(&document, chain.definition(), RunOptions::new(document.body()))?;
//! ```

use crate::model::Model;

/// ModelChain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelChainError {
    #[error("no model node with identifier '{0}'")]
    IdentifierNotFound(String),

    /// Sibling insertion next to the top-level node
    #[error("model node '{0}' is the root and has no parent")]
    RootHasNoParent(String),
}

/// Result of [`get_object_by_identifier`]
#[derive(Debug, Clone, Copy)]
pub struct Found<'a> {
    pub object: &'a Model,
    /// `None` when the object is the root
    pub parent: Option<&'a Model>,
}

/// Pre-order depth-first search for the node carrying `identifier`
pub fn get_object_by_identifier<'a>(identifier: &str, definition: &'a Model) -> Option<Found<'a>> {
    fn walk<'a>(identifier: &str, object: &'a Model, parent: Option<&'a Model>) -> Option<Found<'a>> {
        if object.identifier.as_deref() == Some(identifier) {
            return Some(Found { object, parent });
        }
        object
            .children
            .iter()
            .find_map(|child| walk(identifier, child, Some(object)))
    }
    walk(identifier, definition, None)
}

/// Child index path from the root to the node carrying `identifier`
fn find_path(identifier: &str, object: &Model) -> Option<Vec<usize>> {
    if object.identifier.as_deref() == Some(identifier) {
        return Some(Vec::new());
    }
    object.children.iter().enumerate().find_map(|(index, child)| {
        find_path(identifier, child).map(|mut path| {
            path.insert(0, index);
            path
        })
    })
}

fn node_at<'a>(mut object: &'a mut Model, path: &[usize]) -> &'a mut Model {
    for &index in path {
        object = &mut object.children[index];
    }
    object
}

/// Owned model tree with chained structural edits
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChain {
    definition: Model,
}

impl ModelChain {
    /// Chain over a copy of `definition`
    pub fn new(definition: &Model) -> Self {
        Self {
            definition: definition.clone(),
        }
    }

    pub fn definition(&self) -> &Model {
        &self.definition
    }

    pub fn into_definition(self) -> Model {
        self.definition
    }

    fn locate(&mut self, identifier: &str) -> Result<&mut Model, ModelChainError> {
        let path = find_path(identifier, &self.definition)
            .ok_or_else(|| ModelChainError::IdentifierNotFound(identifier.to_string()))?;
        Ok(node_at(&mut self.definition, &path))
    }

    /// Insert as the first child of `parent`, or of the root when `None`
    pub fn prepend(&mut self, parent: Option<&str>, definition: Model) -> Result<&mut Self, ModelChainError> {
        let target = match parent {
            Some(identifier) => self.locate(identifier)?,
            None => &mut self.definition,
        };
        target.children.insert(0, definition);
        Ok(self)
    }

    /// Insert as the last child of `parent`, or of the root when `None`
    pub fn append(&mut self, parent: Option<&str>, definition: Model) -> Result<&mut Self, ModelChainError> {
        let target = match parent {
            Some(identifier) => self.locate(identifier)?,
            None => &mut self.definition,
        };
        target.children.push(definition);
        Ok(self)
    }

    /// Swap the node's whole content, keeping its position
    pub fn replace(&mut self, identifier: &str, definition: Model) -> Result<&mut Self, ModelChainError> {
        *self.locate(identifier)? = definition;
        Ok(self)
    }

    /// Insert as the previous sibling of the node
    pub fn before(&mut self, identifier: &str, definition: Model) -> Result<&mut Self, ModelChainError> {
        self.insert_sibling(identifier, definition, 0)
    }

    /// Insert as the next sibling of the node
    pub fn after(&mut self, identifier: &str, definition: Model) -> Result<&mut Self, ModelChainError> {
        self.insert_sibling(identifier, definition, 1)
    }

    fn insert_sibling(&mut self, identifier: &str, definition: Model, offset: usize) -> Result<&mut Self, ModelChainError> {
        let mut path = find_path(identifier, &self.definition)
            .ok_or_else(|| ModelChainError::IdentifierNotFound(identifier.to_string()))?;
        let index = path
            .pop()
            .ok_or_else(|| ModelChainError::RootHasNoParent(identifier.to_string()))?;
        node_at(&mut self.definition, &path)
            .children
            .insert(index + offset, definition);
        Ok(self)
    }
}
