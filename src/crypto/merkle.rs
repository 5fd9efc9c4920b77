//! Tree hashing
//!
//! The CryptoNote tree hash used for block transaction roots, and branch
//! reconstruction used to prove a leaf (coinbase or merge-mined block) sits
//! under a given root.

use super::{hash_pair, Hash, HASH_SIZE};

/// Maximum usable branch depth: one path bit per bit of a hash
pub const MAX_BRANCH_DEPTH: usize = 8 * HASH_SIZE;

/// Compute the tree hash of a list of hashes
///
/// An empty list yields the zero hash.
pub fn tree_hash(hashes: &[Hash]) -> Hash {
    match hashes.len() {
        0 => Hash::zero(),
        1 => hashes[0],
        2 => hash_pair(&hashes[0], &hashes[1]),
        count => {
            // Largest power of two strictly below count
            let mut cnt = 2usize;
            while cnt * 2 < count {
                cnt *= 2;
            }

            let direct = 2 * cnt - count;
            let mut ints: Vec<Hash> = Vec::with_capacity(cnt);
            ints.extend_from_slice(&hashes[..direct]);
            for pair in hashes[direct..].chunks(2) {
                ints.push(hash_pair(&pair[0], &pair[1]));
            }

            while cnt > 2 {
                cnt /= 2;
                for j in 0..cnt {
                    ints[j] = hash_pair(&ints[2 * j], &ints[2 * j + 1]);
                }
            }

            hash_pair(&ints[0], &ints[1])
        }
    }
}

/// Build the branch proving `hashes[0]` against `tree_hash(hashes)`
///
/// Branch entries are ordered root-most first; an empty list yields an
/// empty branch.
pub fn tree_branch(hashes: &[Hash]) -> Vec<Hash> {
    let count = hashes.len();
    if count <= 1 {
        return Vec::new();
    }

    let mut cnt = 1usize;
    let mut depth = 0usize;
    while cnt * 2 <= count {
        cnt *= 2;
        depth += 1;
    }

    let mut ints: Vec<Hash> = Vec::with_capacity(cnt - 1);
    ints.extend_from_slice(&hashes[1..2 * cnt - count]);
    let mut i = 2 * cnt - count;
    while ints.len() < cnt - 1 {
        ints.push(hash_pair(&hashes[i], &hashes[i + 1]));
        i += 2;
    }

    let mut branch = vec![Hash::zero(); depth];
    while depth > 0 {
        cnt /= 2;
        depth -= 1;
        branch[depth] = ints[0];
        for j in 0..cnt.saturating_sub(1) {
            ints[j] = hash_pair(&ints[2 * j + 1], &ints[2 * j + 2]);
        }
    }

    branch
}

/// Recompute a tree root from a leaf and its branch
///
/// `path` selects, bit by bit, on which side the running hash sits at each
/// depth: a set bit puts it on the right. Without a path the leaf is
/// always the left-most element.
pub fn tree_hash_from_branch(branch: &[Hash], leaf: &Hash, path: Option<&Hash>) -> Hash {
    let mut current = *leaf;

    for depth in (0..branch.len()).rev() {
        let on_right = path
            .and_then(|p| p.0.get(depth >> 3))
            .map_or(false, |byte| byte & (1 << (depth & 7)) != 0);

        current = if on_right {
            hash_pair(&branch[depth], &current)
        } else {
            hash_pair(&current, &branch[depth])
        };
    }

    current
}
