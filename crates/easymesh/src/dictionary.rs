//! Dictionary of coincident vertices.
//!
//! Vertices registered at the same location (within epsilon) form a group.
//! The first one registered at a location is the group's master; every later
//! one points directly at it, so the master-of relation is never more than one
//! hop deep.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::DEFAULT_EPSILON;

/// Relation of a vertex to its coincident group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterRef {
    /// The vertex was never registered.
    DoesNotExist,
    /// Registered, no other vertex at its location.
    Alone,
    /// Representative of a group with at least one follower.
    Master,
    /// Member of the group represented by the given vertex id.
    Follower(usize),
}

/// Whether seed vertices stand for their whole coincident group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coincidence {
    /// Only the seed id itself matches.
    Exact,
    /// Any vertex coincident with the seed matches.
    Grouped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Alone,
    Master,
    Follower(usize),
}

#[derive(Debug, Clone)]
struct Entry {
    id: usize,
    position: Point3<f32>,
    link: Link,
}

/// Maps vertex ids to the master vertex of their location.
#[derive(Debug, Clone)]
pub struct VertexAdjacency {
    entries: Vec<Entry>,
    /// Vertex id → position in `entries`.
    lookup: HashMap<usize, usize>,
    /// Ids of `Alone` and `Master` entries, in registration order.
    masters: Vec<usize>,
    epsilon: f32,
}

impl Default for VertexAdjacency {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexAdjacency {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Creates a dictionary where vertices closer than `epsilon` are coincident.
    pub fn with_epsilon(epsilon: f32) -> Self {
        Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
            masters: Vec::new(),
            epsilon,
        }
    }

    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lookup.clear();
        self.masters.clear();
    }

    /// Registers vertex `id` at `position`. Already registered ids are ignored.
    pub fn register_vertex(&mut self, id: usize, position: Point3<f32>) {
        if self.lookup.contains_key(&id) {
            return;
        }

        let epsilon_sq = self.epsilon * self.epsilon;
        let found = self.masters.iter().copied().find(|master| {
            let entry = &self.entries[self.lookup[master]];
            (entry.position - position).norm_squared() <= epsilon_sq
        });

        let link = match found {
            Some(master) => {
                let entry = &mut self.entries[self.lookup[&master]];
                if entry.link == Link::Alone {
                    entry.link = Link::Master;
                }
                Link::Follower(master)
            }
            None => {
                self.masters.push(id);
                Link::Alone
            }
        };

        self.lookup.insert(id, self.entries.len());
        self.entries.push(Entry { id, position, link });
    }

    pub fn find_vertex_master(&self, id: usize) -> MasterRef {
        match self.lookup.get(&id).map(|pos| self.entries[*pos].link) {
            None => MasterRef::DoesNotExist,
            Some(Link::Alone) => MasterRef::Alone,
            Some(Link::Master) => MasterRef::Master,
            Some(Link::Follower(master)) => MasterRef::Follower(master),
        }
    }

    /// Other vertices sharing `id`'s location, master first.
    ///
    /// Returns `None` when `id` is unregistered or alone.
    pub fn find_matching_vertices(&self, id: usize) -> Option<Vec<usize>> {
        let master = match self.find_vertex_master(id) {
            MasterRef::DoesNotExist | MasterRef::Alone => return None,
            MasterRef::Master => id,
            MasterRef::Follower(master) => master,
        };

        let mut matching = Vec::new();
        if master != id {
            matching.push(master);
        }
        matching.extend(
            self.entries
                .iter()
                .filter(|e| e.link == Link::Follower(master) && e.id != id)
                .map(|e| e.id),
        );

        (!matching.is_empty()).then_some(matching)
    }

    /// Triangles (offsets into `indices`, from `first` on) that contain a
    /// vertex of every seed group.
    ///
    /// `seeds` holds one to three vertex ids; repeated ids count once and
    /// ids past the third are ignored. Offsets listed in `ignored` are skipped.
    pub fn find_connected_triangles(
        &self,
        seeds: &[usize],
        indices: &[u32],
        first: usize,
        ignored: &[usize],
        coincidence: Coincidence,
    ) -> Vec<usize> {
        let seeds = &seeds[..seeds.len().min(3)];
        let groups: Vec<Vec<usize>> = seeds
            .iter()
            .enumerate()
            .filter(|(i, seed)| !seeds[..*i].contains(*seed))
            .map(|(_, seed)| self.group(*seed, coincidence))
            .collect();
        if groups.is_empty() {
            return Vec::new();
        }

        (first..indices.len().saturating_sub(2))
            .step_by(3)
            .filter(|offset| !ignored.contains(offset))
            .filter(|offset| {
                let corners = &indices[*offset..*offset + 3];
                groups
                    .iter()
                    .all(|group| group.iter().any(|v| corners.iter().any(|c| *c as usize == *v)))
            })
            .collect()
    }

    /// Vertices sharing a triangle with `seed` (or one of its coincident
    /// twins). Coincident vertices are reported once, through their master.
    pub fn find_connected_vertices(
        &self,
        seed: usize,
        indices: &[u32],
        first: usize,
        ignored: &[usize],
    ) -> Vec<usize> {
        let own_group = self.group(seed, Coincidence::Grouped);
        let mut connected = Vec::new();

        for offset in
            self.find_connected_triangles(&[seed], indices, first, ignored, Coincidence::Grouped)
        {
            for corner in &indices[offset..offset + 3] {
                let vertex = *corner as usize;
                if own_group.contains(&vertex) {
                    continue;
                }
                let representative = match self.find_vertex_master(vertex) {
                    MasterRef::Follower(master) => master,
                    _ => vertex,
                };
                if !connected.contains(&representative) {
                    connected.push(representative);
                }
            }
        }

        connected
    }

    /// Removes vertex `id`, returning whether it was registered.
    ///
    /// A removed master hands its group to its first follower.
    pub fn remove_vertex(&mut self, id: usize) -> bool {
        let Some(pos) = self.lookup.remove(&id) else {
            return false;
        };
        let removed = self.entries.remove(pos);
        for p in self.lookup.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }

        match removed.link {
            Link::Alone => self.masters.retain(|m| *m != id),
            Link::Master => {
                let followers: Vec<usize> = self
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.link == Link::Follower(id))
                    .map(|(p, _)| p)
                    .collect();
                let Some((&heir_pos, rest)) = followers.split_first() else {
                    self.masters.retain(|m| *m != id);
                    return true;
                };
                let heir = self.entries[heir_pos].id;
                self.entries[heir_pos].link = if rest.is_empty() {
                    Link::Alone
                } else {
                    Link::Master
                };
                for p in rest {
                    self.entries[*p].link = Link::Follower(heir);
                }
                if let Some(slot) = self.masters.iter_mut().find(|m| **m == id) {
                    *slot = heir;
                }
            }
            Link::Follower(master) => {
                let orphaned = !self.entries.iter().any(|e| e.link == Link::Follower(master));
                if orphaned {
                    if let Some(p) = self.lookup.get(&master) {
                        self.entries[*p].link = Link::Alone;
                    }
                }
            }
        }

        true
    }

    /// `id` plus, when grouped, every vertex coincident with it.
    fn group(&self, id: usize, coincidence: Coincidence) -> Vec<usize> {
        let mut group = vec![id];
        if coincidence == Coincidence::Grouped {
            if let Some(matching) = self.find_matching_vertices(id) {
                group.extend(matching);
            }
        }
        group
    }
}
