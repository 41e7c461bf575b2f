//! Collective operations over a [`Transport`]
//!
//! Every collective runs as one or two bulk-synchronous supersteps. All
//! processes of the group must call the same collectives in the same order
//! with matching sizes, roots and operators.

use std::mem;
use std::sync::Arc;

use tracing::debug;

use super::cost::{self, Algorithm};
use super::transport::Transport;
use crate::algebra::monoid::AssociativityCheck;
use crate::algebra::Operator;
use crate::config::CollectivesConfig;
use crate::error::{check_size, Error, Result};
use crate::types::Scalar;

/// Half-open range of chunk `k` when `len` elements are cut into `p` chunks
#[inline]
pub(crate) fn chunk_bounds(len: usize, p: usize, k: usize) -> (usize, usize) {
    (k * len / p, (k + 1) * len / p)
}

/// Width of the groups of the two-level tree: `⌈√P⌉`
fn tree_width(p: usize) -> usize {
    let mut q = (p as f64).sqrt() as usize;
    while q * q < p {
        q += 1;
    }
    q.max(1)
}

/// Folds `parts`, given in rank order, into `out`
fn fold_in_order<T, Op>(op: &Op, out: &mut [T], parts: Vec<Vec<T>>) -> Result<()>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
{
    let mut parts = parts.into_iter();
    if let Some(first) = parts.next() {
        check_size("combine", out.len(), first.len())?;
        out.clone_from_slice(&first);
    }
    for part in parts {
        check_size("combine", out.len(), part.len())?;
        for (acc, x) in out.iter_mut().zip(&part) {
            *acc = op.apply(acc, x);
        }
    }
    Ok(())
}

/// Where a combined result has to end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Root(usize),
    All,
}

impl Target {
    fn receives(self, pid: usize) -> bool {
        match self {
            Target::Root(root) => root == pid,
            Target::All => true,
        }
    }

    fn ranks(self, p: usize) -> Vec<usize> {
        match self {
            Target::Root(root) => vec![root],
            Target::All => (0..p).collect(),
        }
    }
}

/// Collective communication for one process of a group
pub struct Collectives {
    transport: Arc<dyn Transport>,
    config: CollectivesConfig,
}

impl Collectives {
    /// Wraps the endpoint `transport`, using `config` for algorithm selection
    pub fn new(transport: Arc<dyn Transport>, config: CollectivesConfig) -> Self {
        Self { transport, config }
    }

    /// Rank of this process
    #[inline]
    pub fn pid(&self) -> usize {
        self.transport.pid()
    }

    /// Number of processes in the group
    #[inline]
    pub fn nprocs(&self) -> usize {
        self.transport.nprocs()
    }

    /// Blocks until every process reaches the barrier
    pub fn barrier(&self) -> Result<()> {
        self.transport.sync()
    }

    fn check_root(&self, root: usize) -> Result<()> {
        if root < self.nprocs() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index: root,
                size: self.nprocs(),
            })
        }
    }

    fn algorithm<T>(&self, op: &'static str, elements: usize, commutative: bool) -> Algorithm {
        let algorithm = cost::choose(
            &self.config,
            self.nprocs(),
            elements,
            mem::size_of::<T>(),
            commutative,
        );
        debug!(op, ?algorithm, p = self.nprocs(), elements, "collective");
        algorithm
    }

    /// One superstep: deposit `outgoing` (destination, data) pairs, then
    /// collect what every rank sent to this process
    fn superstep<T: Scalar>(&self, outgoing: Vec<(usize, Vec<T>)>) -> Result<Vec<Option<Vec<T>>>> {
        for (dest, data) in outgoing {
            if let Err(err) = self.transport.put(dest, Box::new(data)) {
                self.transport.abort();
                return Err(err);
            }
        }
        self.transport.sync()?;

        let mut raw = Vec::with_capacity(self.nprocs());
        for src in 0..self.nprocs() {
            raw.push(self.transport.get(src)?);
        }
        // Mailboxes must be drained everywhere before the next superstep
        self.transport.sync()?;

        raw.into_iter()
            .map(|payload| match payload {
                None => Ok(None),
                Some(boxed) => boxed
                    .downcast::<Vec<T>>()
                    .map(|data| Some(*data))
                    .map_err(|_| Error::Panic("payload of unexpected type".to_string())),
            })
            .collect()
    }

    /// Takes the payload from `src`, failing if it never arrived
    fn take_from<T>(incoming: &mut [Option<Vec<T>>], src: usize) -> Result<Vec<T>> {
        incoming[src]
            .take()
            .ok_or_else(|| Error::Panic(format!("missing message from process {}", src)))
    }

    /// Broadcasts the root's `value` to every process
    pub fn broadcast<T: Scalar>(&self, value: &mut T, root: usize) -> Result<()> {
        let mut buf = vec![mem::take(value)];
        let result = self.broadcast_vec(&mut buf, root);
        *value = buf.pop().unwrap_or_default();
        result
    }

    /// Broadcasts the root's `values` to every process
    ///
    /// Every process must pass a vector of the root's length; it is
    /// overwritten with the root's contents.
    pub fn broadcast_vec<T: Scalar>(&self, values: &mut Vec<T>, root: usize) -> Result<()> {
        self.check_root(root)?;
        let p = self.nprocs();
        if p == 1 {
            return Ok(());
        }
        let pid = self.pid();

        match self.algorithm::<T>("broadcast", values.len(), true) {
            Algorithm::OneStep => {
                let outgoing = if pid == root {
                    (0..p).filter(|&d| d != root).map(|d| (d, values.clone())).collect()
                } else {
                    Vec::new()
                };
                let mut incoming = self.superstep(outgoing)?;
                if pid != root {
                    *values = Self::take_from(&mut incoming, root)?;
                }
            }
            Algorithm::Tree => {
                let q = tree_width(p);
                let rel = (pid + p - root) % p;
                let abs = |r: usize| (r + root) % p;

                // Root to the group leaders
                let outgoing = if rel == 0 {
                    (q..p).step_by(q).map(|r| (abs(r), values.clone())).collect()
                } else {
                    Vec::new()
                };
                let mut incoming = self.superstep(outgoing)?;
                if rel != 0 && rel % q == 0 {
                    *values = Self::take_from(&mut incoming, root)?;
                }

                // Leaders to their group members
                let outgoing = if rel % q == 0 {
                    (rel + 1..(rel + q).min(p)).map(|r| (abs(r), values.clone())).collect()
                } else {
                    Vec::new()
                };
                let mut incoming = self.superstep(outgoing)?;
                if rel % q != 0 {
                    *values = Self::take_from(&mut incoming, abs(rel - rel % q))?;
                }
            }
            Algorithm::Transpose => {
                let len = values.len();
                // Root scatters one chunk to every process
                let outgoing = if pid == root {
                    (0..p)
                        .filter(|&d| d != root)
                        .map(|d| {
                            let (lo, hi) = chunk_bounds(len, p, d);
                            (d, values[lo..hi].to_vec())
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                let mut incoming = self.superstep(outgoing)?;
                let mine = if pid == root {
                    let (lo, hi) = chunk_bounds(len, p, pid);
                    values[lo..hi].to_vec()
                } else {
                    Self::take_from(&mut incoming, root)?
                };

                // Everybody shares its chunk with everybody
                let outgoing = (0..p).filter(|&d| d != pid).map(|d| (d, mine.clone())).collect();
                let mut incoming = self.superstep(outgoing)?;
                if pid != root {
                    let mut assembled = Vec::with_capacity(len);
                    for src in 0..p {
                        if src == pid {
                            assembled.extend(mine.iter().cloned());
                        } else {
                            assembled.extend(Self::take_from(&mut incoming, src)?);
                        }
                    }
                    *values = assembled;
                }
            }
        }
        Ok(())
    }

    /// Reduces one value per process into the root's `value`
    ///
    /// The values are combined in rank order, so `op` needs to be
    /// associative but not commutative.
    pub fn reduce<T, Op>(&self, value: &mut T, op: Op, root: usize) -> Result<()>
    where
        T: Scalar,
        Op: Operator<D1 = T, D2 = T, D3 = T>,
    {
        self.combine(std::slice::from_mut(value), op, root)
    }

    /// Reduces one value per process and hands the result to every process
    pub fn allreduce<T, Op>(&self, value: &mut T, op: Op) -> Result<()>
    where
        T: Scalar,
        Op: Operator<D1 = T, D2 = T, D3 = T>,
    {
        self.allcombine(std::slice::from_mut(value), op)
    }

    /// Element-wise reduction of equal-length vectors into the root's `values`
    pub fn combine<T, Op>(&self, values: &mut [T], op: Op, root: usize) -> Result<()>
    where
        T: Scalar,
        Op: Operator<D1 = T, D2 = T, D3 = T>,
    {
        self.check_root(root)?;
        self.combine_into(values, op, Target::Root(root))
    }

    /// Element-wise reduction of equal-length vectors, result on every process
    pub fn allcombine<T, Op>(&self, values: &mut [T], op: Op) -> Result<()>
    where
        T: Scalar,
        Op: Operator<D1 = T, D2 = T, D3 = T>,
    {
        self.combine_into(values, op, Target::All)
    }

    fn combine_into<T, Op>(&self, values: &mut [T], op: Op, target: Target) -> Result<()>
    where
        T: Scalar,
        Op: Operator<D1 = T, D2 = T, D3 = T>,
    {
        #[allow(clippy::let_unit_value)]
        let () = AssociativityCheck::<Op>::OK;

        let p = self.nprocs();
        if p == 1 {
            return Ok(());
        }
        let pid = self.pid();
        let len = values.len();

        match self.algorithm::<T>("combine", len, Op::COMMUTATIVE) {
            Algorithm::OneStep => {
                let outgoing = target
                    .ranks(p)
                    .into_iter()
                    .filter(|&d| d != pid)
                    .map(|d| (d, values.to_vec()))
                    .collect();
                let mut incoming = self.superstep(outgoing)?;
                if target.receives(pid) {
                    let mut parts = Vec::with_capacity(p);
                    for src in 0..p {
                        parts.push(if src == pid {
                            values.to_vec()
                        } else {
                            Self::take_from(&mut incoming, src)?
                        });
                    }
                    fold_in_order(&op, values, parts)?;
                }
            }
            Algorithm::Tree => {
                let q = tree_width(p);
                let leader = pid - pid % q;

                // Members to their group leader
                let outgoing = if pid != leader {
                    vec![(leader, values.to_vec())]
                } else {
                    Vec::new()
                };
                let mut incoming = self.superstep(outgoing)?;
                let mut partial = values.to_vec();
                if pid == leader {
                    let mut parts = vec![values.to_vec()];
                    for src in pid + 1..(pid + q).min(p) {
                        parts.push(Self::take_from(&mut incoming, src)?);
                    }
                    fold_in_order(&op, &mut partial, parts)?;
                }

                // Leaders to the target
                let outgoing = if pid == leader {
                    target
                        .ranks(p)
                        .into_iter()
                        .filter(|&d| d != pid)
                        .map(|d| (d, partial.clone()))
                        .collect()
                } else {
                    Vec::new()
                };
                let mut incoming = self.superstep(outgoing)?;
                if target.receives(pid) {
                    let mut parts = Vec::new();
                    for src in (0..p).step_by(q) {
                        parts.push(if src == pid {
                            partial.clone()
                        } else {
                            Self::take_from(&mut incoming, src)?
                        });
                    }
                    fold_in_order(&op, values, parts)?;
                }
            }
            Algorithm::Transpose => {
                // Chunk k of every process goes to process k
                let outgoing = (0..p)
                    .filter(|&d| d != pid)
                    .map(|d| {
                        let (lo, hi) = chunk_bounds(len, p, d);
                        (d, values[lo..hi].to_vec())
                    })
                    .collect();
                let mut incoming = self.superstep(outgoing)?;
                let (lo, hi) = chunk_bounds(len, p, pid);
                let mut reduced = values[lo..hi].to_vec();
                let mut parts = Vec::with_capacity(p);
                for src in 0..p {
                    parts.push(if src == pid {
                        values[lo..hi].to_vec()
                    } else {
                        Self::take_from(&mut incoming, src)?
                    });
                }
                fold_in_order(&op, &mut reduced, parts)?;

                // Reduced chunks to the target
                let outgoing = target
                    .ranks(p)
                    .into_iter()
                    .filter(|&d| d != pid)
                    .map(|d| (d, reduced.clone()))
                    .collect();
                let mut incoming = self.superstep(outgoing)?;
                if target.receives(pid) {
                    for src in 0..p {
                        let (lo, hi) = chunk_bounds(len, p, src);
                        let chunk = if src == pid {
                            mem::take(&mut reduced)
                        } else {
                            Self::take_from(&mut incoming, src)?
                        };
                        check_size("combine", hi - lo, chunk.len())?;
                        values[lo..hi].clone_from_slice(&chunk);
                    }
                }
            }
        }
        Ok(())
    }

    /// Concatenates every process's `src` on the root, in rank order
    ///
    /// `dst` is left untouched on the other processes.
    pub fn gather<T: Scalar>(&self, src: &[T], dst: &mut Vec<T>, root: usize) -> Result<()> {
        self.check_root(root)?;
        let pid = self.pid();
        debug!(op = "gather", p = self.nprocs(), elements = src.len(), "collective");
        let outgoing = if pid != root {
            vec![(root, src.to_vec())]
        } else {
            Vec::new()
        };
        let incoming = if self.nprocs() == 1 {
            vec![None]
        } else {
            self.superstep(outgoing)?
        };
        if pid == root {
            *dst = Self::concat(src, incoming, pid)?;
        }
        Ok(())
    }

    /// Concatenates every process's `src` on every process, in rank order
    pub fn allgather<T: Scalar>(&self, src: &[T], dst: &mut Vec<T>) -> Result<()> {
        let pid = self.pid();
        let p = self.nprocs();
        debug!(op = "allgather", p, elements = src.len(), "collective");
        let incoming = if p == 1 {
            vec![None]
        } else {
            let outgoing = (0..p).filter(|&d| d != pid).map(|d| (d, src.to_vec())).collect();
            self.superstep(outgoing)?
        };
        *dst = Self::concat(src, incoming, pid)?;
        Ok(())
    }

    fn concat<T: Scalar>(own: &[T], mut incoming: Vec<Option<Vec<T>>>, pid: usize) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for src in 0..incoming.len() {
            if src == pid {
                out.extend_from_slice(own);
            } else {
                out.extend(Self::take_from(&mut incoming, src)?);
            }
        }
        Ok(out)
    }

    /// Hands chunk `k` of the root's `src` to process `k`
    ///
    /// The root's vector is cut into `P` contiguous chunks whose lengths
    /// differ by at most one.
    pub fn scatter<T: Scalar>(&self, src: &[T], dst: &mut Vec<T>, root: usize) -> Result<()> {
        self.check_root(root)?;
        let (pid, p) = (self.pid(), self.nprocs());
        debug!(op = "scatter", p, elements = src.len(), "collective");
        let chunk = |k: usize| {
            let (lo, hi) = chunk_bounds(src.len(), p, k);
            src[lo..hi].to_vec()
        };
        if p == 1 {
            *dst = src.to_vec();
            return Ok(());
        }
        let outgoing = if pid == root {
            (0..p).filter(|&d| d != root).map(|d| (d, chunk(d))).collect()
        } else {
            Vec::new()
        };
        let mut incoming = self.superstep(outgoing)?;
        *dst = if pid == root {
            chunk(pid)
        } else {
            Self::take_from(&mut incoming, root)?
        };
        Ok(())
    }

    /// Sends chunk `k` of `src` to process `k`; `dst` receives one chunk
    /// from every process, in rank order
    ///
    /// Fails with [`Error::Mismatch`] if `src` does not divide into `P`
    /// equal chunks.
    pub fn alltoall<T: Scalar>(&self, src: &[T], dst: &mut Vec<T>) -> Result<()> {
        let (pid, p) = (self.pid(), self.nprocs());
        if src.len() % p != 0 {
            return Err(Error::Mismatch {
                op: "alltoall",
                expected: (src.len() / p + 1) * p,
                got: src.len(),
            });
        }
        debug!(op = "alltoall", p, elements = src.len(), "collective");
        let width = src.len() / p;
        let chunk = |k: usize| src[k * width..(k + 1) * width].to_vec();
        let incoming = if p == 1 {
            vec![None]
        } else {
            let outgoing = (0..p).filter(|&d| d != pid).map(|d| (d, chunk(d))).collect();
            self.superstep(outgoing)?
        };
        *dst = Self::concat(&chunk(pid), incoming, pid)?;
        Ok(())
    }

    /// Variable-size all-to-all exchange
    ///
    /// Process `k` receives `src[out_disp[k]..out_disp[k] + out_counts[k]]`,
    /// and what process `k` sends lands at `dst[in_disp[k]..in_disp[k] + in_counts[k]]`.
    /// Source and destination are distinct buffers. Fails with
    /// [`Error::Mismatch`] if a count array does not have length `P`, a
    /// range falls outside its buffer, or a received chunk disagrees with
    /// `in_counts`.
    pub fn alltoallv<T: Scalar>(
        &self,
        src: &[T],
        out_counts: &[usize],
        out_disp: &[usize],
        dst: &mut [T],
        in_counts: &[usize],
        in_disp: &[usize],
    ) -> Result<()> {
        let (pid, p) = (self.pid(), self.nprocs());
        for arr in [out_counts, out_disp, in_counts, in_disp] {
            check_size("alltoallv", p, arr.len())?;
        }
        for k in 0..p {
            if out_disp[k] + out_counts[k] > src.len() {
                return Err(Error::Mismatch {
                    op: "alltoallv",
                    expected: src.len(),
                    got: out_disp[k] + out_counts[k],
                });
            }
            if in_disp[k] + in_counts[k] > dst.len() {
                return Err(Error::Mismatch {
                    op: "alltoallv",
                    expected: dst.len(),
                    got: in_disp[k] + in_counts[k],
                });
            }
        }
        debug!(op = "alltoallv", p, elements = src.len(), "collective");

        let chunk = |k: usize| src[out_disp[k]..out_disp[k] + out_counts[k]].to_vec();
        let mut incoming = if p == 1 {
            vec![None]
        } else {
            let outgoing = (0..p).filter(|&d| d != pid).map(|d| (d, chunk(d))).collect();
            self.superstep(outgoing)?
        };

        for k in 0..p {
            let data = if k == pid {
                chunk(pid)
            } else {
                Self::take_from(&mut incoming, k)?
            };
            check_size("alltoallv", in_counts[k], data.len())?;
            dst[in_disp[k]..in_disp[k] + in_counts[k]].clone_from_slice(&data);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Add, RightAssign};
    use crate::collectives::LocalTransport;
    use std::thread;

    /// Runs `f` on every process of a fresh group and returns the results in rank order
    fn spmd<R, F>(p: usize, algorithm: Option<Algorithm>, f: F) -> Vec<R>
    where
        R: Send + 'static,
        F: Fn(&Collectives) -> R + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let config = CollectivesConfig {
            force_algorithm: algorithm,
            ..CollectivesConfig::default()
        };
        let handles: Vec<_> = LocalTransport::group(p)
            .unwrap()
            .into_iter()
            .map(|t| {
                let f = Arc::clone(&f);
                let config = config.clone();
                thread::spawn(move || f(&Collectives::new(Arc::new(t), config)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    const ALGORITHMS: [Algorithm; 3] = [Algorithm::OneStep, Algorithm::Tree, Algorithm::Transpose];

    #[test]
    fn test_tree_width() {
        assert_eq!(tree_width(1), 1);
        assert_eq!(tree_width(4), 2);
        assert_eq!(tree_width(5), 3);
        assert_eq!(tree_width(9), 3);
    }

    #[test]
    fn test_broadcast_all_algorithms() {
        for algorithm in ALGORITHMS {
            let out = spmd(5, Some(algorithm), |c| {
                let mut v = if c.pid() == 2 { (0..12).collect() } else { vec![0; 12] };
                c.broadcast_vec(&mut v, 2).unwrap();
                v
            });
            for v in out {
                assert_eq!(v, (0..12).collect::<Vec<i32>>(), "{:?}", algorithm);
            }
        }
    }

    #[test]
    fn test_allcombine_all_algorithms() {
        for algorithm in ALGORITHMS {
            let out = spmd(6, Some(algorithm), |c| {
                let mut v: Vec<i64> = (0..10).map(|i| i * (c.pid() as i64 + 1)).collect();
                c.allcombine(&mut v, Add::<i64>::new()).unwrap();
                v
            });
            let expected: Vec<i64> = (0..10).map(|i| i * 21).collect();
            for v in out {
                assert_eq!(v, expected, "{:?}", algorithm);
            }
        }
    }

    #[test]
    fn test_reduce_to_root() {
        for algorithm in ALGORITHMS {
            let out = spmd(4, Some(algorithm), |c| {
                let mut x = c.pid() as u32 + 1;
                c.reduce(&mut x, Add::<u32>::new(), 3).unwrap();
                x
            });
            assert_eq!(out[3], 10, "{:?}", algorithm);
        }
    }

    #[test]
    fn test_reduce_keeps_rank_order() {
        // Right-assign keeps the last operand, so rank order decides the result
        let out = spmd(4, None, |c| {
            let mut x = c.pid() as i32 * 7;
            c.reduce(&mut x, RightAssign::<i32>::new(), 0).unwrap();
            x
        });
        assert_eq!(out[0], 21);
    }

    #[test]
    fn test_gather_scatter() {
        let out = spmd(3, None, |c| {
            let mut all = Vec::new();
            c.gather(&[c.pid() * 2, c.pid() * 2 + 1], &mut all, 0).unwrap();
            let mut back = Vec::new();
            c.scatter(&all, &mut back, 0).unwrap();
            let mut everyone = Vec::new();
            c.allgather(&[c.pid()], &mut everyone).unwrap();
            (all, back, everyone)
        });
        assert_eq!(out[0].0, vec![0, 1, 2, 3, 4, 5]);
        for (pid, (_, back, everyone)) in out.into_iter().enumerate() {
            assert_eq!(back, vec![pid * 2, pid * 2 + 1]);
            assert_eq!(everyone, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_alltoall() {
        let out = spmd(3, None, |c| {
            let src: Vec<usize> = (0..3).map(|k| c.pid() * 10 + k).collect();
            let mut dst = Vec::new();
            c.alltoall(&src, &mut dst).unwrap();
            dst
        });
        assert_eq!(out[1], vec![1, 11, 21]);
    }

    #[test]
    fn test_alltoallv() {
        // Process s sends s+1 copies of s to every process
        let out = spmd(3, None, |c| {
            let p = c.nprocs();
            let s = c.pid();
            let src = vec![s; (s + 1) * p];
            let out_counts = vec![s + 1; p];
            let out_disp: Vec<usize> = (0..p).map(|k| k * (s + 1)).collect();
            let in_counts: Vec<usize> = (0..p).map(|k| k + 1).collect();
            let in_disp: Vec<usize> = (0..p).map(|k| k * (k + 1) / 2).collect();
            let mut dst = vec![usize::MAX; 6];
            c.alltoallv(&src, &out_counts, &out_disp, &mut dst, &in_counts, &in_disp).unwrap();
            dst
        });
        for dst in out {
            assert_eq!(dst, vec![0, 1, 1, 2, 2, 2]);
        }
    }

    #[test]
    fn test_single_process_is_noop() {
        let out = spmd(1, None, |c| {
            let mut x = 3.5f64;
            c.broadcast(&mut x, 0).unwrap();
            c.allreduce(&mut x, Add::<f64>::new()).unwrap();
            x
        });
        assert_eq!(out, vec![3.5]);
    }

    #[test]
    fn test_invalid_root() {
        let out = spmd(2, None, |c| {
            let mut x = 0u8;
            c.broadcast(&mut x, 2).unwrap_err().rc()
        });
        assert!(out.iter().all(|&rc| rc == crate::Rc::Mismatch));
    }
}
