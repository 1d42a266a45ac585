// Category tree (node types).
//
// `TypeRegistry` owns every `NodeType` keyed by `TypeId`. Types form a
// forest: a type's parent must already be registered when the type is added,
// so cycles cannot arise. Each type records its child types and the ids of
// the nodes currently of that type, which lets `MapState::delete_type`
// cascade into the graph.
//
// Each type also caches its `NodeCategory`, derived from its name through
// the configured `CategoryNames`. The router asks "is this node a Street?"
// on every expansion, so the string comparison happens once per rename
// instead of once per edge.
//
// All references are ids resolved through the registry. Deletion here is
// shallow (`remove_type`); cascading is driven by `map.rs` using
// `subtree_post_order`, which walks with an explicit stack.

use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::CategoryNames;
use crate::error::{MapError, Result};
use crate::types::{NodeCategory, NodeId, TypeId};

/// A category in the type tree.
#[derive(Clone, Debug)]
pub struct NodeType {
    pub id: TypeId,
    pub parent: Option<TypeId>,
    pub name: String,
    pub category: NodeCategory,
    pub children: SmallVec<[TypeId; 4]>,
    /// Nodes directly of this type.
    pub nodes: BTreeSet<NodeId>,
}

/// Registry of all node types.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: BTreeMap<TypeId, NodeType>,
    names: CategoryNames,
}

impl TypeRegistry {
    pub fn new(names: CategoryNames) -> Self {
        Self {
            types: BTreeMap::new(),
            names,
        }
    }

    /// Register a type. Fails if `parent` is set but unknown, or if `id` is
    /// already taken.
    pub fn add_type(&mut self, id: TypeId, parent: Option<TypeId>, name: &str) -> Result<()> {
        if self.types.contains_key(&id) {
            return Err(MapError::DuplicateType(id));
        }
        if let Some(parent_id) = parent {
            let parent_type = self
                .types
                .get_mut(&parent_id)
                .ok_or_else(|| MapError::missing_type_parent(id, parent_id))?;
            parent_type.children.push(id);
        }
        self.types.insert(
            id,
            NodeType {
                id,
                parent,
                name: name.to_owned(),
                category: self.names.classify(name),
                children: SmallVec::new(),
                nodes: BTreeSet::new(),
            },
        );
        Ok(())
    }

    /// Rename a type in place. Returns the category before and after.
    pub fn rename_type(&mut self, id: TypeId, name: &str) -> Result<(NodeCategory, NodeCategory)> {
        let category = self.names.classify(name);
        let node_type = self.types.get_mut(&id).ok_or(MapError::UnknownType(id))?;
        let previous = node_type.category;
        node_type.name = name.to_owned();
        node_type.category = category;
        Ok((previous, category))
    }

    /// `id` followed by all of its descendant types, children before
    /// parents. The order is safe for deletion: no type is removed while a
    /// child still points at it.
    pub fn subtree_post_order(&self, id: TypeId) -> Result<Vec<TypeId>> {
        if !self.types.contains_key(&id) {
            return Err(MapError::UnknownType(id));
        }
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current);
                continue;
            }
            stack.push((current, true));
            if let Some(node_type) = self.types.get(&current) {
                stack.extend(node_type.children.iter().rev().map(|&child| (child, false)));
            }
        }
        Ok(order)
    }

    /// Remove a single type and detach it from its parent. Child types must
    /// already be gone.
    pub fn remove_type(&mut self, id: TypeId) -> Result<NodeType> {
        let removed = self.types.remove(&id).ok_or(MapError::UnknownType(id))?;
        debug_assert!(removed.children.is_empty(), "{id} removed before its children");
        if let Some(parent) = removed.parent.and_then(|p| self.types.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }
        Ok(removed)
    }

    /// Record that `node` is of type `type_id`.
    pub fn attach_node(&mut self, type_id: TypeId, node: NodeId) -> Result<()> {
        let node_type = self
            .types
            .get_mut(&type_id)
            .ok_or(MapError::UnknownType(type_id))?;
        node_type.nodes.insert(node);
        Ok(())
    }

    /// Forget that `node` is of type `type_id`. Unknown types are ignored:
    /// the type may be mid-deletion.
    pub fn detach_node(&mut self, type_id: TypeId, node: NodeId) {
        if let Some(node_type) = self.types.get_mut(&type_id) {
            node_type.nodes.remove(&node);
        }
    }

    pub fn get(&self, id: TypeId) -> Option<&NodeType> {
        self.types.get(&id)
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Category of a type; unknown types count as `Other`.
    pub fn category(&self, id: TypeId) -> NodeCategory {
        self.types
            .get(&id)
            .map_or(NodeCategory::Other, |t| t.category)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn clear(&mut self) {
        self.types.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParentLink;

    fn registry() -> TypeRegistry {
        TypeRegistry::new(CategoryNames::default())
    }

    #[test]
    fn add_type_links_parent_and_child() {
        let mut reg = registry();
        reg.add_type(TypeId(1), None, "Building").unwrap();
        reg.add_type(TypeId(2), Some(TypeId(1)), "Floor").unwrap();
        assert_eq!(reg.get(TypeId(1)).unwrap().children.as_slice(), &[TypeId(2)]);
        assert_eq!(reg.get(TypeId(2)).unwrap().parent, Some(TypeId(1)));
        assert_eq!(reg.category(TypeId(1)), NodeCategory::Building);
        assert_eq!(reg.category(TypeId(2)), NodeCategory::Other);
    }

    #[test]
    fn add_type_rejects_missing_parent() {
        let mut reg = registry();
        let err = reg.add_type(TypeId(2), Some(TypeId(1)), "Floor").unwrap_err();
        assert!(matches!(
            err,
            MapError::MissingParent(ParentLink::Type {
                child: TypeId(2),
                parent: TypeId(1),
            })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn add_type_rejects_duplicate_id() {
        let mut reg = registry();
        reg.add_type(TypeId(1), None, "Building").unwrap();
        let err = reg.add_type(TypeId(1), None, "Street").unwrap_err();
        assert!(matches!(err, MapError::DuplicateType(TypeId(1))));
        assert_eq!(reg.category(TypeId(1)), NodeCategory::Building);
    }

    #[test]
    fn rename_reclassifies() {
        let mut reg = registry();
        reg.add_type(TypeId(1), None, "Path").unwrap();
        let (before, after) = reg.rename_type(TypeId(1), "Street").unwrap();
        assert_eq!(before, NodeCategory::Other);
        assert_eq!(after, NodeCategory::Street);
        assert_eq!(reg.get(TypeId(1)).unwrap().name, "Street");
        assert!(matches!(
            reg.rename_type(TypeId(9), "x"),
            Err(MapError::UnknownType(TypeId(9)))
        ));
    }

    #[test]
    fn subtree_post_order_lists_children_first() {
        let mut reg = registry();
        reg.add_type(TypeId(1), None, "Building").unwrap();
        reg.add_type(TypeId(2), Some(TypeId(1)), "Floor").unwrap();
        reg.add_type(TypeId(3), Some(TypeId(2)), "Room").unwrap();
        reg.add_type(TypeId(4), Some(TypeId(1)), "Door").unwrap();
        reg.add_type(TypeId(5), None, "Street").unwrap();

        let order = reg.subtree_post_order(TypeId(1)).unwrap();
        assert_eq!(order, vec![TypeId(3), TypeId(2), TypeId(4), TypeId(1)]);
        for id in order {
            reg.remove_type(id).unwrap();
        }
        assert_eq!(reg.len(), 1);
        assert!(reg.contains(TypeId(5)));
    }

    #[test]
    fn remove_type_detaches_from_parent() {
        let mut reg = registry();
        reg.add_type(TypeId(1), None, "Building").unwrap();
        reg.add_type(TypeId(2), Some(TypeId(1)), "Floor").unwrap();
        reg.remove_type(TypeId(2)).unwrap();
        assert!(reg.get(TypeId(1)).unwrap().children.is_empty());
    }

    #[test]
    fn attach_and_detach_nodes() {
        let mut reg = registry();
        reg.add_type(TypeId(1), None, "Room").unwrap();
        reg.attach_node(TypeId(1), NodeId(10)).unwrap();
        reg.attach_node(TypeId(1), NodeId(11)).unwrap();
        reg.detach_node(TypeId(1), NodeId(10));
        let nodes: Vec<_> = reg.get(TypeId(1)).unwrap().nodes.iter().copied().collect();
        assert_eq!(nodes, vec![NodeId(11)]);
        assert!(reg.attach_node(TypeId(2), NodeId(1)).is_err());
    }
}
