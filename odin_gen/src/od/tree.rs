use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use odin_types::ParameterDecl;

use crate::od::access::AccessCollection;
use crate::od::error::{OdError, OdResult};
use crate::od::extensions::Extension;
use crate::od::registry::TypeRegistry;

/// Width of a global id in bits.
pub const MAX_ID_BITS: u32 = 32;

/// Name of the synthetic root group.
pub const ROOT_NAME: &str = "root";

/* ============================================================================
   C reference names
   ============================================================================ */

/// Identifiers the C backend anchors the absolute references on.
#[derive(Debug, Clone, PartialEq)]
pub struct CNames {
    pub objects_type: String,
    pub objects_name: String,
    pub variables_type: String,
    pub variables_name: String,
    pub groups_name: String,
}

/* ============================================================================
   Resolved tree
   ============================================================================ */

/// Index of a node inside the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The resolved parameter tree. Nodes live in an arena and refer to each
/// other by index; children are stored in declaration order. The tree is
/// built once by [`ResolvedTree::resolve`] and never mutated afterwards,
/// except for the absolute C references set by
/// [`ResolvedTree::initialise_types`].
#[derive(Debug)]
pub struct ResolvedTree {
    nodes: Vec<ResolvedNode>,
    root: NodeId,
}

#[derive(Debug)]
pub struct ResolvedNode {
    pub name: String,
    /// Dot-joined absolute path from the root, including the root name.
    pub path: String,
    pub local_id: u32,
    pub global_id: u32,
    pub description: Option<String>,
    /// Effective access control: the path-wise merge from the root down to
    /// this node.
    pub access: AccessCollection,
    pub parent: Option<NodeId>,
    /// Absolute reference into the backing variables struct.
    pub variable_ref: String,
    /// Absolute reference into the descriptor objects struct.
    pub object_ref: String,
    pub kind: ResolvedKind,
}

#[derive(Debug)]
pub enum ResolvedKind {
    Group(GroupNode),
    Parameter(ParameterNode),
    Array(ArrayNode),
    Vector(VectorNode),
}

#[derive(Debug)]
pub struct GroupNode {
    pub id_space_shift: u32,
    pub children: Vec<NodeId>,
    /// Absolute reference of the emitted group descriptor variable.
    pub group_ref: String,
}

#[derive(Debug)]
pub struct ParameterNode {
    pub type_name: String,
    /// Void parameters occupy no storage and carry no default.
    pub void: bool,
    pub default: Option<Value>,
    pub reference: Option<String>,
    pub extensions: Vec<Extension>,
}

#[derive(Debug)]
pub struct ArrayNode {
    pub type_name: String,
    pub elements: usize,
    pub default: Option<Value>,
    pub reference: Option<String>,
    pub extensions: Vec<Extension>,
}

#[derive(Debug)]
pub struct VectorNode {
    pub type_name: String,
    pub max_elements: usize,
    pub default: Option<Value>,
    pub reference: Option<String>,
    pub extensions: Vec<Extension>,
}

impl ResolvedNode {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ResolvedKind::Group(_))
    }

    /// The description, falling back to a placeholder for display.
    pub fn resolved_description(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }

    /// Registry name of the bound type, for typed leaves.
    pub fn type_name(&self) -> Option<&str> {
        match &self.kind {
            ResolvedKind::Parameter(p) => Some(&p.type_name),
            ResolvedKind::Array(p) => Some(&p.type_name),
            ResolvedKind::Vector(p) => Some(&p.type_name),
            ResolvedKind::Group(_) => None,
        }
    }

    pub fn extensions(&self) -> &[Extension] {
        match &self.kind {
            ResolvedKind::Parameter(p) => &p.extensions,
            ResolvedKind::Array(p) => &p.extensions,
            ResolvedKind::Vector(p) => &p.extensions,
            ResolvedKind::Group(_) => &[],
        }
    }

    /// External storage override, for typed leaves.
    pub fn storage_reference(&self) -> Option<&str> {
        match &self.kind {
            ResolvedKind::Parameter(p) => p.reference.as_deref(),
            ResolvedKind::Array(p) => p.reference.as_deref(),
            ResolvedKind::Vector(p) => p.reference.as_deref(),
            ResolvedKind::Group(_) => None,
        }
    }
}

impl ResolvedTree {
    /// Resolve the declared root children into a frozen tree.
    ///
    /// A single depth-first walk binds types, computes paths and global
    /// ids, merges access control and appends implicit extensions; two
    /// follow-up passes reject global id collisions and unresolvable
    /// extension references.
    pub fn resolve(
        children: &IndexMap<String, ParameterDecl>,
        id_space_shift: u32,
        root_access: AccessCollection,
        registry: &TypeRegistry,
    ) -> OdResult<Self> {
        let mut resolver = Resolver {
            registry,
            nodes: Vec::new(),
        };

        resolver.nodes.push(ResolvedNode {
            name: ROOT_NAME.to_string(),
            path: ROOT_NAME.to_string(),
            local_id: 0,
            global_id: 0,
            description: None,
            access: root_access,
            parent: None,
            variable_ref: String::new(),
            object_ref: String::new(),
            kind: ResolvedKind::Group(GroupNode {
                id_space_shift,
                children: Vec::new(),
                group_ref: String::new(),
            }),
        });

        let root = NodeId(0);
        resolver.resolve_group_children(root, children, 0)?;

        let tree = ResolvedTree {
            nodes: resolver.nodes,
            root,
        };
        tree.check_global_id_map()?;
        tree.check_extension_references()?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &ResolvedNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0].kind {
            ResolvedKind::Group(group) => &group.children,
            _ => &[],
        }
    }

    /// All nodes below the root in depth-first declaration order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        self.collect_descendants(self.root, &mut order);
        order
    }

    fn collect_descendants(&self, id: NodeId, order: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            order.push(child);
            self.collect_descendants(child, order);
        }
    }

    /// Find parameters by a dot-separated path from the root. A `*`
    /// segment matches all children of the current group; descending into
    /// a non-group node with remaining segments matches nothing.
    pub fn find_parameters_by_object_name(&self, path: &str) -> Vec<NodeId> {
        self.find_from(self.root, path)
    }

    /// Find exactly one parameter by path.
    pub fn find_parameter_by_object_name(&self, path: &str) -> Option<NodeId> {
        let matches = self.find_parameters_by_object_name(path);
        match matches.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    fn find_from(&self, group: NodeId, path: &str) -> Vec<NodeId> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };

        let children = self.children(group);
        if head == "*" {
            return children.to_vec();
        }

        let Some(&child) = children
            .iter()
            .find(|&&id| self.nodes[id.0].name == head)
        else {
            return Vec::new();
        };

        match (&self.nodes[child.0].kind, rest) {
            (ResolvedKind::Group(_), Some(rest)) => self.find_from(child, rest),
            (_, None) => vec![child],
            (_, Some(_)) => Vec::new(),
        }
    }

    /// Set the absolute variable, object and group references by
    /// concatenation from the emitter-supplied root names.
    pub fn initialise_types(&mut self, names: &CNames) {
        {
            let root = &mut self.nodes[self.root.0];
            root.variable_ref = names.variables_name.clone();
            root.object_ref = names.objects_name.clone();
            if let ResolvedKind::Group(group) = &mut root.kind {
                group.group_ref = names.groups_name.clone();
            }
        }

        let mut stack = vec![self.root];
        while let Some(parent) = stack.pop() {
            let parent_variable = self.nodes[parent.0].variable_ref.clone();
            let parent_object = self.nodes[parent.0].object_ref.clone();
            let parent_group = match &self.nodes[parent.0].kind {
                ResolvedKind::Group(group) => group.group_ref.clone(),
                _ => continue,
            };

            let children: Vec<NodeId> = self.children(parent).to_vec();
            for child in children {
                let node = &mut self.nodes[child.0];
                node.variable_ref = format!("{parent_variable}.{}", node.name);
                node.object_ref = format!("{parent_object}.{}", node.name);
                if let ResolvedKind::Group(group) = &mut node.kind {
                    group.group_ref = format!("{parent_group}_{}", node.name);
                    stack.push(child);
                }
            }
        }
    }

    /// Global ids must form an injective mapping over the whole tree.
    fn check_global_id_map(&self) -> OdResult<()> {
        let mut map: HashMap<u32, NodeId> = HashMap::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(previous) = map.insert(node.global_id, NodeId(index)) {
                return Err(OdError::IdCollision {
                    global_id: node.global_id,
                    first: self.nodes[previous.0].path.clone(),
                    second: node.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every extension pointing at a parameter must resolve to exactly one
    /// node reachable from the root.
    fn check_extension_references(&self) -> OdResult<()> {
        for node in &self.nodes {
            for extension in node.extensions() {
                if let Some(reference) = extension.parameter_reference() {
                    if self.find_parameter_by_object_name(reference).is_none() {
                        return Err(OdError::UnresolvedReference {
                            location: node.path.clone(),
                            reference: reference.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/* ============================================================================
   Resolution walk
   ============================================================================ */

struct Resolver<'a> {
    registry: &'a TypeRegistry,
    nodes: Vec<ResolvedNode>,
}

impl Resolver<'_> {
    /// Resolve the children of one group. `used_bits` is the id space
    /// consumed by the ancestors above the group.
    fn resolve_group_children(
        &mut self,
        parent: NodeId,
        decls: &IndexMap<String, ParameterDecl>,
        used_bits: u32,
    ) -> OdResult<()> {
        let (parent_path, parent_global, parent_shift, parent_access) = {
            let node = &self.nodes[parent.0];
            let shift = match &node.kind {
                ResolvedKind::Group(group) => group.id_space_shift,
                _ => unreachable!("only groups have children"),
            };
            (node.path.clone(), node.global_id, shift, node.access.clone())
        };

        if used_bits + parent_shift > MAX_ID_BITS {
            return Err(OdError::id_space(
                &parent_path,
                format!(
                    "cumulative id shift {} exceeds the {MAX_ID_BITS} bit id width",
                    used_bits + parent_shift
                ),
            ));
        }
        let place_shift = MAX_ID_BITS - (used_bits + parent_shift);

        for (name, decl) in decls {
            let path = format!("{parent_path}.{name}");

            let declared_id = decl.local_id();
            if declared_id < 0 {
                return Err(OdError::id_space(
                    &path,
                    format!("local id {declared_id} is negative"),
                ));
            }
            if declared_id as u64 >= 1u64 << parent_shift {
                return Err(OdError::id_space(
                    &path,
                    format!("local id {declared_id} does not fit in {parent_shift} bits"),
                ));
            }
            let local_id = declared_id as u32;
            let global_id = parent_global | ((local_id as u64) << place_shift) as u32;

            let own_access = AccessCollection::from_decl(decl.access_control(), &path)?;
            let access = parent_access.merge(&own_access);

            let kind = self.resolve_kind(decl, &path)?;

            let id = NodeId(self.nodes.len());
            self.nodes.push(ResolvedNode {
                name: name.clone(),
                path,
                local_id,
                global_id,
                description: decl.description().map(str::to_string),
                access,
                parent: Some(parent),
                variable_ref: String::new(),
                object_ref: String::new(),
                kind,
            });
            if let ResolvedKind::Group(group) = &mut self.nodes[parent.0].kind {
                group.children.push(id);
            }

            if let ParameterDecl::Group(group_decl) = decl {
                self.resolve_group_children(id, &group_decl.children, used_bits + parent_shift)?;
            }
        }

        Ok(())
    }

    fn resolve_kind(&self, decl: &ParameterDecl, path: &str) -> OdResult<ResolvedKind> {
        match decl {
            ParameterDecl::Group(group) => Ok(ResolvedKind::Group(GroupNode {
                id_space_shift: group.id_space_shift,
                children: Vec::new(),
                group_ref: String::new(),
            })),

            ParameterDecl::Parameter(scalar) | ParameterDecl::Void(scalar) => {
                let void = matches!(decl, ParameterDecl::Void(_));
                let resolved = self.registry.lookup_at(&scalar.primitive, path)?;

                let mut extensions: Vec<Extension> =
                    scalar.extensions.iter().map(Extension::from).collect();

                // A string-serialised user type implies a codec extension.
                if let Some(user) = resolved.user() {
                    if let Some(serialiser) = &user.string_serialiser {
                        extensions.push(Extension::StringCodecReference {
                            reference: serialiser.clone(),
                        });
                    }
                }

                Ok(ResolvedKind::Parameter(ParameterNode {
                    type_name: resolved.typename.clone(),
                    void,
                    default: if void { None } else { scalar.default.clone() },
                    reference: scalar.reference.clone(),
                    extensions,
                }))
            }

            ParameterDecl::Array(array) => {
                let resolved = self.registry.lookup_at(&array.primitive, path)?;
                if array.elements < 1 {
                    return Err(OdError::schema(path, "elements must be at least 1"));
                }
                Ok(ResolvedKind::Array(ArrayNode {
                    type_name: resolved.typename.clone(),
                    elements: array.elements as usize,
                    default: array.default.clone(),
                    reference: array.reference.clone(),
                    extensions: array.extensions.iter().map(Extension::from).collect(),
                }))
            }

            ParameterDecl::Vector(vector) => {
                let resolved = self.registry.lookup_at(&vector.primitive, path)?;
                if vector.max_elements < 1 {
                    return Err(OdError::schema(path, "max_elements must be at least 1"));
                }
                Ok(ResolvedKind::Vector(VectorNode {
                    type_name: resolved.typename.clone(),
                    max_elements: vector.max_elements as usize,
                    default: vector.default.clone(),
                    reference: vector.reference.clone(),
                    extensions: vector.extensions.iter().map(Extension::from).collect(),
                }))
            }
        }
    }
}
