//! Line-sequence alignment engine.
//!
//! Greedy longest-matching-block alignment in the Ratcliff/Obershelp
//! style: repeatedly find the longest run of lines common to both
//! sequences, then recurse on the pieces to its left and right. Lines are
//! opaque tokens compared by exact equality. The result is an edit script
//! of opcodes that partitions both sequences completely and in order, plus
//! a similarity ratio in [0, 1].
//!
//! Tie-breaks prefer the earliest left index, then the earliest right
//! index, so output is deterministic for identical inputs.

use std::collections::HashMap;

/// One edit-script operation over half-open ranges: `[i1, i2)` indexes the
/// left sequence, `[j1, j2)` the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Equal { i1: usize, i2: usize, j1: usize, j2: usize },
    Delete { i1: usize, i2: usize },
    Insert { j1: usize, j2: usize },
    Replace { i1: usize, i2: usize, j1: usize, j2: usize },
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub opcodes: Vec<Opcode>,
    /// `2*M / (len(left) + len(right))` where `M` is the total number of
    /// matched lines; 1.0 for two empty sequences.
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy)]
struct Block {
    i: usize,
    j: usize,
    size: usize,
}

/// Align `left` against `right` and compute the similarity ratio.
pub fn align(left: &[String], right: &[String]) -> Alignment {
    let blocks = matching_blocks(left, right);
    let matched: usize = blocks.iter().map(|b| b.size).sum();
    let total = left.len() + right.len();
    let ratio = if total == 0 {
        1.0
    } else {
        2.0 * matched as f64 / total as f64
    };
    Alignment {
        opcodes: opcodes_from_blocks(&blocks, left.len(), right.len()),
        ratio,
    }
}

/// Index of each right-side line to the positions it occupies, in order.
fn line_positions(right: &[String]) -> HashMap<&str, Vec<usize>> {
    let mut map: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, line) in right.iter().enumerate() {
        map.entry(line.as_str()).or_default().push(j);
    }
    map
}

/// Longest block of lines equal between `left[alo..ahi]` and
/// `right[blo..bhi]`. Among equally long blocks the one starting earliest
/// in `left` wins, then earliest in `right`.
fn longest_match(
    left: &[String],
    positions: &HashMap<&str, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> Block {
    let mut best = Block {
        i: alo,
        j: blo,
        size: 0,
    };
    // run_lengths[j] = length of the common run ending at (i, j).
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();
    for (i, line) in left.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions.get(line.as_str()) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j == 0 {
                    1
                } else {
                    run_lengths.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next_runs.insert(j, k);
                if k > best.size {
                    best = Block {
                        i: i + 1 - k,
                        j: j + 1 - k,
                        size: k,
                    };
                }
            }
        }
        run_lengths = next_runs;
    }
    best
}

/// All matching blocks in ascending order, with adjacent blocks merged.
fn matching_blocks(left: &[String], right: &[String]) -> Vec<Block> {
    let positions = line_positions(right);
    let mut queue: Vec<(usize, usize, usize, usize)> = vec![(0, left.len(), 0, right.len())];
    let mut blocks: Vec<Block> = vec![];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let block = longest_match(left, &positions, alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        if alo < block.i && blo < block.j {
            queue.push((alo, block.i, blo, block.j));
        }
        if block.i + block.size < ahi && block.j + block.size < bhi {
            queue.push((block.i + block.size, ahi, block.j + block.size, bhi));
        }
        blocks.push(block);
    }

    blocks.sort_by_key(|b| (b.i, b.j));

    // Merge runs the divide-and-conquer split apart.
    let mut merged: Vec<Block> = vec![];
    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.i + last.size == block.i && last.j + last.size == block.j => {
                last.size += block.size;
            }
            _ => merged.push(block),
        }
    }
    merged
}

/// Turn the matching blocks into a complete, ordered edit script. The gap
/// before each block (and after the last one) becomes a replace, delete,
/// or insert depending on which sides have unconsumed lines.
fn opcodes_from_blocks(blocks: &[Block], left_len: usize, right_len: usize) -> Vec<Opcode> {
    let mut opcodes: Vec<Opcode> = vec![];
    let (mut i, mut j) = (0usize, 0usize);

    fn push_gap(opcodes: &mut Vec<Opcode>, i: usize, i2: usize, j: usize, j2: usize) {
        if i < i2 && j < j2 {
            opcodes.push(Opcode::Replace { i1: i, i2, j1: j, j2 });
        } else if i < i2 {
            opcodes.push(Opcode::Delete { i1: i, i2 });
        } else if j < j2 {
            opcodes.push(Opcode::Insert { j1: j, j2 });
        }
    }

    for block in blocks {
        push_gap(&mut opcodes, i, block.i, j, block.j);
        opcodes.push(Opcode::Equal {
            i1: block.i,
            i2: block.i + block.size,
            j1: block.j,
            j2: block.j + block.size,
        });
        i = block.i + block.size;
        j = block.j + block.size;
    }
    push_gap(&mut opcodes, i, left_len, j, right_len);
    opcodes
}
