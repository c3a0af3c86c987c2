use std::sync::Arc;

use super::group::Group;
use super::node::{Client, NodeKind, NodeRef, Person, Program, Project, Task};

/// The client → program → project → person/task hierarchy.
///
/// Children are held behind `Arc`, so cloning a tree is cheap and an edit made
/// through [`Arc::make_mut`] copies only the spine from the root down to the
/// edited node. Untouched siblings stay shared with the previous tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkTree {
    pub clients: Vec<Arc<Client>>,
}

/// Position of a node, as child indexes from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Client(usize),
    Program(usize, usize),
    Project(usize, usize, usize),
    Person(usize, usize, usize, usize),
    Task(usize, usize, usize, usize),
}

impl Location {
    pub fn kind(&self) -> NodeKind {
        match self {
            Location::Client(..) => NodeKind::Client,
            Location::Program(..) => NodeKind::Program,
            Location::Project(..) => NodeKind::Project,
            Location::Person(..) => NodeKind::Person,
            Location::Task(..) => NodeKind::Task,
        }
    }
}

impl WorkTree {
    pub fn new(clients: Vec<Client>) -> Self {
        Self {
            clients: clients.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.clients.iter().map(|c| NodeRef::Client(c))
    }

    /// Depth-first, pre-order visit of every node.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(NodeRef<'a>)) {
        for root in self.roots() {
            root.walk(&mut visit);
        }
    }

    /// Ids of every node in the tree.
    pub fn descendant_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.walk(|n| ids.push(n.id()));
        ids
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.clients
            .iter()
            .flat_map(|c| c.programs.iter())
            .flat_map(|p| p.projects.iter())
            .map(|p| p.as_ref())
    }

    pub fn project_ids(&self) -> Vec<&str> {
        self.projects().map(|p| p.id.as_str()).collect()
    }

    pub fn find_project(&self, id: &str) -> Option<&Project> {
        self.projects().find(|p| p.id == id)
    }

    pub fn find_client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id).map(|c| c.as_ref())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.projects()
            .flat_map(|p| p.tasks.iter())
            .map(|t| t.as_ref())
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    /// Every assignment node, across all projects.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.projects()
            .flat_map(|p| p.people.iter())
            .map(|p| p.as_ref())
    }

    pub fn find(&self, id: &str) -> Option<NodeRef<'_>> {
        self.locate(id).and_then(|loc| self.node_at(loc))
    }

    /// Projects under the given client, in tree order.
    pub fn projects_for_client<'a>(&'a self, client_id: &'a str) -> impl Iterator<Item = &'a Project> {
        self.clients
            .iter()
            .filter(move |c| c.id == client_id)
            .flat_map(|c| c.programs.iter())
            .flat_map(|p| p.projects.iter())
            .map(|p| p.as_ref())
    }

    /// The tree restricted to one client, or all of it for `None`. Subtrees
    /// stay shared with `self`. An unknown client gives an empty tree.
    pub fn for_client(&self, client_id: Option<&str>) -> WorkTree {
        match client_id {
            None => self.clone(),
            Some(id) => WorkTree {
                clients: self.clients.iter().filter(|c| c.id == id).cloned().collect(),
            },
        }
    }

    /// Finds the first node with this id, in pre-order.
    pub fn locate(&self, id: &str) -> Option<Location> {
        for (ci, client) in self.clients.iter().enumerate() {
            if client.id == id {
                return Some(Location::Client(ci));
            }
            for (pi, program) in client.programs.iter().enumerate() {
                if program.id == id {
                    return Some(Location::Program(ci, pi));
                }
                for (ji, project) in program.projects.iter().enumerate() {
                    if project.id == id {
                        return Some(Location::Project(ci, pi, ji));
                    }
                    if let Some(k) = project.people.iter().position(|p| p.id == id) {
                        return Some(Location::Person(ci, pi, ji, k));
                    }
                    if let Some(k) = project.tasks.iter().position(|t| t.id == id) {
                        return Some(Location::Task(ci, pi, ji, k));
                    }
                }
            }
        }
        None
    }

    /// Like [`WorkTree::locate`] but only matches a node of the given kind.
    pub fn locate_kind(&self, id: &str, kind: NodeKind) -> Option<Location> {
        match kind {
            NodeKind::Client => self
                .clients
                .iter()
                .position(|c| c.id == id)
                .map(Location::Client),
            _ => {
                let mut found = None;
                self.walk_locations(|loc, node| {
                    if found.is_none() && node.kind() == kind && node.id() == id {
                        found = Some(loc);
                    }
                });
                found
            }
        }
    }

    /// Every assignment node of one person, in pre-order.
    pub fn person_locations(&self, person_id: &str) -> Vec<Location> {
        let mut found = Vec::new();
        self.walk_locations(|loc, node| {
            if let NodeRef::Person(p) = node {
                if p.person_id == person_id {
                    found.push(loc);
                }
            }
        });
        found
    }

    fn walk_locations<'a>(&'a self, mut visit: impl FnMut(Location, NodeRef<'a>)) {
        for (ci, client) in self.clients.iter().enumerate() {
            visit(Location::Client(ci), NodeRef::Client(client));
            for (pi, program) in client.programs.iter().enumerate() {
                visit(Location::Program(ci, pi), NodeRef::Program(program));
                for (ji, project) in program.projects.iter().enumerate() {
                    visit(Location::Project(ci, pi, ji), NodeRef::Project(project));
                    for (k, person) in project.people.iter().enumerate() {
                        visit(Location::Person(ci, pi, ji, k), NodeRef::Person(person));
                    }
                    for (k, task) in project.tasks.iter().enumerate() {
                        visit(Location::Task(ci, pi, ji, k), NodeRef::Task(task));
                    }
                }
            }
        }
    }

    /// `None` when `loc` does not point into this tree.
    pub fn node_at(&self, loc: Location) -> Option<NodeRef<'_>> {
        let client = |c: usize| self.clients.get(c);
        let program = |c: usize, p: usize| client(c)?.programs.get(p);
        let project = |c: usize, p: usize, j: usize| program(c, p)?.projects.get(j);
        let node = match loc {
            Location::Client(c) => NodeRef::Client(client(c)?),
            Location::Program(c, p) => NodeRef::Program(program(c, p)?),
            Location::Project(c, p, j) => NodeRef::Project(project(c, p, j)?),
            Location::Person(c, p, j, k) => NodeRef::Person(project(c, p, j)?.people.get(k)?),
            Location::Task(c, p, j, k) => NodeRef::Task(project(c, p, j)?.tasks.get(k)?),
        };
        Some(node)
    }

    // ── Copy-on-write access ────────────────────────────────────────────
    //
    // Each accessor makes the nodes along the path unique (cloning them if
    // they are shared) and leaves every other subtree untouched.

    pub(crate) fn client_mut(&mut self, c: usize) -> &mut Client {
        Arc::make_mut(&mut self.clients[c])
    }

    pub(crate) fn program_mut(&mut self, c: usize, p: usize) -> &mut Program {
        Arc::make_mut(&mut self.client_mut(c).programs[p])
    }

    pub(crate) fn project_mut(&mut self, c: usize, p: usize, j: usize) -> &mut Project {
        Arc::make_mut(&mut self.program_mut(c, p).projects[j])
    }

    pub(crate) fn task_mut(&mut self, c: usize, p: usize, j: usize, k: usize) -> &mut Task {
        Arc::make_mut(&mut self.project_mut(c, p, j).tasks[k])
    }

    pub(crate) fn person_mut(&mut self, loc: Location) -> Option<&mut Person> {
        let Location::Person(c, p, j, k) = loc else {
            return None;
        };
        self.project_mut(c, p, j).people.get_mut(k).map(Arc::make_mut)
    }

    /// Detaches the node at `loc` together with its whole subtree.
    pub(crate) fn remove_at(&mut self, loc: Location) {
        match loc {
            Location::Client(c) => {
                self.clients.remove(c);
            }
            Location::Program(c, p) => {
                self.client_mut(c).programs.remove(p);
            }
            Location::Project(c, p, j) => {
                self.program_mut(c, p).projects.remove(j);
            }
            Location::Person(c, p, j, k) => {
                self.project_mut(c, p, j).people.remove(k);
            }
            Location::Task(c, p, j, k) => {
                self.project_mut(c, p, j).tasks.remove(k);
            }
        }
    }
}

/// Everything the reducer edits: the work tree plus the person groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    pub tree: WorkTree,
    pub groups: Vec<Arc<Group>>,
}

impl Workspace {
    pub fn new(tree: WorkTree, groups: Vec<Group>) -> Self {
        Self {
            tree,
            groups: groups.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn find_group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id).map(|g| g.as_ref())
    }

    pub(crate) fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .map(Arc::make_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clients() -> WorkTree {
        let mut program = Program::new("prog-1", "Brand");
        program.projects.push(Arc::new(Project::new("proj-1", "Rebrand")));
        program.projects.push(Arc::new(Project::new("proj-2", "Refresh")));
        let mut acme = Client::new("client-acme", "Acme");
        acme.programs.push(Arc::new(program));

        let mut other = Program::new("prog-2", "Growth");
        other.projects.push(Arc::new(Project::new("proj-3", "Launch")));
        let mut globex = Client::new("client-globex", "Globex");
        globex.programs.push(Arc::new(other));

        WorkTree::new(vec![acme, globex])
    }

    #[test]
    fn projects_are_scoped_to_their_client() {
        let tree = two_clients();
        let ids: Vec<&str> = tree.projects_for_client("client-acme").map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["proj-1", "proj-2"]);
        assert_eq!(tree.projects_for_client("client-missing").count(), 0);
    }

    #[test]
    fn client_filter_shares_the_kept_subtree() {
        let tree = two_clients();
        let filtered = tree.for_client(Some("client-globex"));
        assert_eq!(filtered.project_ids(), ["proj-3"]);
        assert!(Arc::ptr_eq(&filtered.clients[0], &tree.clients[1]));
        assert_eq!(tree.for_client(None), tree);
        assert!(tree.for_client(Some("client-missing")).is_empty());
    }

    #[test]
    fn stale_location_resolves_to_nothing() {
        let tree = two_clients();
        assert!(tree.node_at(Location::Project(0, 0, 1)).is_some());
        assert!(tree.node_at(Location::Project(0, 0, 2)).is_none());
        assert!(tree.node_at(Location::Task(1, 0, 0, 0)).is_none());
    }
}
