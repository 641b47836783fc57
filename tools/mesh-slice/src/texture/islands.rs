//! UV island detection
//!
//! Two faces belong to the same island when they share a texture vertex,
//! directly or through a chain of other faces.

use hashbrown::HashMap;

use crate::geometry::Face;

/// Union-find over face positions
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Group textured faces into UV islands.
///
/// Islands come out in order of their first face; faces keep their input
/// order inside an island. Untextured faces are left out.
pub fn find_islands<'a>(faces: &[&'a Face]) -> Vec<Vec<&'a Face>> {
    let textured: Vec<&'a Face> = faces.iter().copied().filter(|f| f.is_textured()).collect();
    let mut sets = DisjointSet::new(textured.len());

    // First face seen for each texture vertex
    let mut owner: HashMap<u32, usize> = HashMap::new();
    for (i, face) in textured.iter().enumerate() {
        for &uv in face.uvs() {
            match owner.get(&uv) {
                Some(&j) => sets.union(i, j),
                None => {
                    owner.insert(uv, i);
                }
            }
        }
    }

    let mut island_of_root: HashMap<usize, usize> = HashMap::new();
    let mut islands: Vec<Vec<&'a Face>> = Vec::new();
    for (i, &face) in textured.iter().enumerate() {
        let root = sets.find(i);
        let island = *island_of_root.entry(root).or_insert_with(|| {
            islands.push(Vec::new());
            islands.len() - 1
        });
        islands[island].push(face);
    }

    islands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(uvs: &[u32]) -> Face {
        Face::new(vec![1; uvs.len()], uvs.to_vec())
    }

    fn same(a: &Face, b: &Face) -> bool {
        std::ptr::eq(a, b)
    }

    #[test]
    fn test_transitive_islands() {
        // A-B share uv 3, B-C share uv 7, D shares nothing
        let a = face(&[1, 2, 3]);
        let b = face(&[3, 4, 7]);
        let c = face(&[7, 8, 9]);
        let d = face(&[10, 11, 12]);

        let islands = find_islands(&[&a, &d, &c, &b]);

        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].len(), 3);
        assert!(same(islands[0][0], &a));
        assert!(same(islands[0][1], &c));
        assert!(same(islands[0][2], &b));
        assert_eq!(islands[1].len(), 1);
        assert!(same(islands[1][0], &d));
    }

    #[test]
    fn test_matches_pairwise_closure() {
        // Compare against a naive grow-until-stable grouping
        let faces: Vec<Face> = (0..40u32)
            .map(|i| face(&[i * 3 % 29 + 1, i * 5 % 31 + 100, i * 7 % 37 + 200]))
            .collect();
        let refs: Vec<&Face> = faces.iter().collect();

        let islands = find_islands(&refs);

        let mut remaining: Vec<&Face> = refs.clone();
        let mut expected: Vec<Vec<&Face>> = Vec::new();
        while !remaining.is_empty() {
            let mut group = vec![remaining.remove(0)];
            loop {
                let before = group.len();
                let mut i = 0;
                while i < remaining.len() {
                    if group.iter().any(|g| g.shares_uv(remaining[i])) {
                        group.push(remaining.remove(i));
                    } else {
                        i += 1;
                    }
                }
                if group.len() == before {
                    break;
                }
            }
            expected.push(group);
        }

        assert_eq!(islands.len(), expected.len());
        for (got, want) in islands.iter().zip(&expected) {
            assert_eq!(got.len(), want.len());
            assert!(want.iter().all(|w| got.iter().any(|g| same(g, w))));
        }
    }

    #[test]
    fn test_untextured_faces_skipped() {
        let a = face(&[1, 2, 3]);
        let plain = Face::new(vec![1, 2, 3], vec![]);

        let islands = find_islands(&[&plain, &a]);
        assert_eq!(islands.len(), 1);
        assert!(same(islands[0][0], &a));
    }

    #[test]
    fn test_empty_input() {
        assert!(find_islands(&[]).is_empty());
    }
}
