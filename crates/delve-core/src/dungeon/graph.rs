//! Room adjacency graph built from the door list
//!
//! Only interior doors (both endpoints present and in range) form edges.
//! Traversals visit neighbours in door-list order so results are stable.

use std::collections::VecDeque;

use super::door::DungeonDoor;
use super::room::RoomId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGraph {
    adjacency: Vec<Vec<usize>>,
}

impl RoomGraph {
    pub fn from_doors(room_count: usize, doors: &[DungeonDoor]) -> Self {
        let mut adjacency = vec![Vec::new(); room_count];
        for (a, b) in doors.iter().filter_map(DungeonDoor::endpoints) {
            let (a, b) = (a.index(), b.index());
            if a == b || a >= room_count || b >= room_count {
                continue;
            }
            if !adjacency[a].contains(&b) {
                adjacency[a].push(b);
            }
            if !adjacency[b].contains(&a) {
                adjacency[b].push(a);
            }
        }
        Self { adjacency }
    }

    pub fn room_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, room: RoomId) -> impl Iterator<Item = RoomId> + '_ {
        self.adjacency
            .get(room.index())
            .into_iter()
            .flatten()
            .map(|&i| RoomId(i))
    }

    /// BFS hop counts from `start`; unreachable rooms get -1
    pub fn distances_from(&self, start: RoomId) -> Vec<i32> {
        let mut dist = vec![-1; self.adjacency.len()];
        if start.index() >= dist.len() {
            return dist;
        }
        dist[start.index()] = 0;
        let mut queue = VecDeque::from([start.index()]);
        while let Some(current) = queue.pop_front() {
            for &next in &self.adjacency[current] {
                if dist[next] < 0 {
                    dist[next] = dist[current] + 1;
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Rooms reachable from `start`, including itself
    pub fn reachable_count(&self, start: RoomId) -> usize {
        self.distances_from(start).iter().filter(|&&d| d >= 0).count()
    }

    /// Connected components by depth-first search, each sorted by id.
    /// Components are ordered by their lowest room id.
    pub fn components(&self) -> Vec<Vec<RoomId>> {
        let mut seen = vec![false; self.adjacency.len()];
        let mut components = Vec::new();
        for root in 0..self.adjacency.len() {
            if seen[root] {
                continue;
            }
            seen[root] = true;
            let mut stack = vec![root];
            let mut component = Vec::new();
            while let Some(current) = stack.pop() {
                component.push(RoomId(current));
                for &next in &self.adjacency[current] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }

    /// Shortest path of rooms from `from` to `to`, both included
    pub fn path(&self, from: RoomId, to: RoomId) -> Option<Vec<RoomId>> {
        let n = self.adjacency.len();
        if from.index() >= n || to.index() >= n {
            return None;
        }
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut seen = vec![false; n];
        seen[from.index()] = true;
        let mut queue = VecDeque::from([from.index()]);
        while let Some(current) = queue.pop_front() {
            if current == to.index() {
                let mut path = vec![RoomId(current)];
                let mut cursor = current;
                while let Some(p) = parent[cursor] {
                    path.push(RoomId(p));
                    cursor = p;
                }
                path.reverse();
                return Some(path);
            }
            for &next in &self.adjacency[current] {
                if !seen[next] {
                    seen[next] = true;
                    parent[next] = Some(current);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}
