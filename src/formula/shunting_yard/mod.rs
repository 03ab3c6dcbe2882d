//! Two-stack operator-precedence reduction machine.
//!
//! The operand stack holds finished sub-results; the operator stack holds
//! operators waiting for their right-hand side, bounded below by sentinels.
//! A new scope (parenthesised group, argument list) is opened with
//! [`ShuntingYard::within_sentinel`] so operators outside it can never reduce
//! across the boundary.
//!
//! ```text
//! A1 + B1 * C1
//!
//! operands:  A1 B1 C1        operators: S + *
//! reduce *:  A1 (B1*C1)      operators: S +
//! reduce +:  (A1+(B1*C1))    operators: S
//! ```

mod operator;

pub use operator::{Operator, StackEntry};

use crate::common::error::{Error, Result};
use crate::formula::operators::{BinaryOp, UnaryOp};
use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};

/// Values that operators reduce into.
pub trait Reduce: Sized {
    fn reduce_unary(op: UnaryOp, operand: Self) -> Self;
    fn reduce_binary(op: BinaryOp, left: Self, right: Self) -> Self;
}

/// Operand with the height of the tree it stands for; a leaf is 1.
#[derive(Debug)]
struct Slot<T> {
    value: T,
    depth: usize,
}

/// Operand and operator stacks for one parse.
#[derive(Debug)]
pub struct ShuntingYard<T> {
    operands: Vec<Slot<T>>,
    operators: SmallVec<[StackEntry; 16]>,
    /// Operand height below which the innermost scope may not pop.
    floor: usize,
    next_scope: u32,
    /// Tallest reduced operand allowed.
    depth_limit: usize,
}

impl<T: Reduce> Default for ShuntingYard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reduce> ShuntingYard<T> {
    /// Empty stacks, with the root sentinel already in place.
    pub fn new() -> Self {
        let mut operators = SmallVec::new();
        operators.push(StackEntry::Sentinel { scope: 0, floor: 0 });
        Self {
            operands: Vec::new(),
            operators,
            floor: 0,
            next_scope: 1,
            depth_limit: usize::MAX,
        }
    }

    /// Fail reductions that would produce a value taller than `limit`.
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    /// Push a leaf operand.
    #[inline]
    pub fn push_operand(&mut self, operand: T) {
        self.operands.push(Slot {
            value: operand,
            depth: 1,
        });
    }

    fn push_reduced(&mut self, value: T, depth: usize) -> Result<()> {
        if depth > self.depth_limit {
            return Err(Error::DepthLimitExceeded {
                limit: self.depth_limit,
            });
        }
        self.operands.push(Slot { value, depth });
        Ok(())
    }

    fn pop_slot(&mut self) -> Result<Slot<T>> {
        if self.operands.len() <= self.floor {
            return Err(Error::StackUnderflow("operand stack empty"));
        }
        self.operands
            .pop()
            .ok_or(Error::StackUnderflow("operand stack empty"))
    }

    fn pop_slots(&mut self, count: usize) -> Result<Vec<Slot<T>>> {
        let available = self.operands.len().saturating_sub(self.floor);
        if available < count {
            return Err(Error::StackUnderflow("not enough operands for argument list"));
        }
        let at = self.operands.len() - count;
        Ok(self.operands.split_off(at))
    }

    /// Pop one operand belonging to the current scope.
    pub fn pop_operand(&mut self) -> Result<T> {
        self.pop_slot().map(|slot| slot.value)
    }

    /// Pop the last `count` operands of the current scope, in push order.
    pub fn pop_operands(&mut self, count: usize) -> Result<Vec<T>> {
        Ok(self.pop_slots(count)?.into_iter().map(|slot| slot.value).collect())
    }

    /// Replace the last `count` operands of the current scope with the value
    /// `build` makes from them, one level taller than the tallest.
    pub fn reduce_call(&mut self, count: usize, build: impl FnOnce(Vec<T>) -> T) -> Result<()> {
        let slots = self.pop_slots(count)?;
        let depth = 1 + slots.iter().map(|slot| slot.depth).max().unwrap_or(0);
        let args = slots.into_iter().map(|slot| slot.value).collect();
        self.push_reduced(build(args), depth)
    }

    /// Number of operands on the stack, across all scopes.
    #[inline]
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Number of entries on the operator stack, sentinels included.
    #[inline]
    pub fn operator_depth(&self) -> usize {
        self.operators.len()
    }

    fn top(&self) -> Result<&StackEntry> {
        self.operators
            .last()
            .ok_or(Error::StackUnderflow("operator stack empty"))
    }

    /// Whether the innermost entry is a scope sentinel.
    pub fn top_is_sentinel(&self) -> bool {
        self.operators.last().is_some_and(StackEntry::is_sentinel)
    }

    /// Reduce every waiting operator that must run before `op`, then push `op`.
    pub fn push_operator(&mut self, op: Operator) -> Result<()> {
        let incoming = StackEntry::Op(op);
        while self.top()?.evaluates_before(&incoming) {
            self.pop_and_reduce()?;
        }
        self.operators.push(incoming);
        Ok(())
    }

    /// Pop the top operator and replace its operands with the reduced value.
    pub fn pop_and_reduce(&mut self) -> Result<()> {
        let StackEntry::Op(op) = *self.top()? else {
            return Err(Error::StackInvariantViolation("attempted to reduce a sentinel"));
        };

        let (reduced, depth) = match op {
            Operator::Binary(op) => {
                let right = self.pop_slot()?;
                let left = self.pop_slot()?;
                let depth = 1 + left.depth.max(right.depth);
                (T::reduce_binary(op, left.value, right.value), depth)
            },
            Operator::Unary(op) => {
                let operand = self.pop_slot()?;
                (T::reduce_unary(op, operand.value), operand.depth + 1)
            },
        };

        self.operators.pop();
        self.push_reduced(reduced, depth)
    }

    /// Reduce until the innermost sentinel is on top.
    pub fn reduce_scope(&mut self) -> Result<()> {
        while !self.top()?.is_sentinel() {
            self.pop_and_reduce()?;
        }
        Ok(())
    }

    /// Run `body` inside a fresh sentinel scope.
    ///
    /// The sentinel is popped and checked on every exit path; an error from
    /// `body` takes priority over a failed check.
    pub fn within_sentinel<R>(&mut self, body: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let mut scope = self.open_scope();
        let outcome = body(&mut *scope);
        let closed = scope.close();
        let value = outcome?;
        closed?;
        Ok(value)
    }

    /// Push a sentinel and return the guard that removes it.
    pub fn open_scope(&mut self) -> SentinelScope<'_, T> {
        let scope = self.next_scope;
        self.next_scope = self.next_scope.wrapping_add(1);
        let outer_floor = self.floor;
        self.floor = self.operands.len();
        self.operators.push(StackEntry::Sentinel {
            scope,
            floor: self.floor,
        });
        SentinelScope {
            yard: self,
            scope,
            outer_floor,
            closed: false,
        }
    }

    fn close_scope(&mut self, scope: u32, outer_floor: usize) -> Result<()> {
        self.floor = outer_floor;
        match self.operators.pop() {
            Some(StackEntry::Sentinel { scope: popped, .. }) if popped == scope => Ok(()),
            Some(_) => Err(Error::StackInvariantViolation(
                "scope closed while its sentinel was not on top",
            )),
            None => Err(Error::StackUnderflow("operator stack empty when closing scope")),
        }
    }

    /// Take the single finished result.
    pub fn finish(mut self) -> Result<T> {
        let slot = self.operands.pop().ok_or(Error::EmptyResult)?;
        if !self.operands.is_empty() {
            return Err(Error::StackInvariantViolation("operands left over after parsing"));
        }
        Ok(slot.value)
    }
}

/// Guard for one sentinel scope.
///
/// Dereferences to the underlying [`ShuntingYard`]. Closing it (explicitly or
/// on drop) pops the sentinel and restores the outer operand floor.
pub struct SentinelScope<'a, T: Reduce> {
    yard: &'a mut ShuntingYard<T>,
    scope: u32,
    outer_floor: usize,
    closed: bool,
}

impl<T: Reduce> SentinelScope<'_, T> {
    /// Pop the sentinel and verify it is the one this scope pushed.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.yard.close_scope(self.scope, self.outer_floor)
    }
}

impl<T: Reduce> Deref for SentinelScope<'_, T> {
    type Target = ShuntingYard<T>;

    fn deref(&self) -> &Self::Target {
        self.yard
    }
}

impl<T: Reduce> DerefMut for SentinelScope<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.yard
    }
}

impl<T: Reduce> Drop for SentinelScope<'_, T> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.yard.close_scope(self.scope, self.outer_floor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fully parenthesised rendering, enough to observe reduction order.
    #[derive(Debug, Clone, PartialEq)]
    struct Expr(String);

    impl Reduce for Expr {
        fn reduce_unary(op: UnaryOp, operand: Self) -> Self {
            Expr(format!("({}{})", op.symbol(), operand.0))
        }

        fn reduce_binary(op: BinaryOp, left: Self, right: Self) -> Self {
            Expr(format!("({}{}{})", left.0, op.symbol(), right.0))
        }
    }

    fn leaf(s: &str) -> Expr {
        Expr(s.to_string())
    }

    fn bin(op: BinaryOp) -> Operator {
        Operator::Binary(op)
    }

    #[test]
    fn test_precedence_reduction() {
        let mut yard = ShuntingYard::new();
        yard.push_operand(leaf("a"));
        yard.push_operator(bin(BinaryOp::Add)).unwrap();
        yard.push_operand(leaf("b"));
        yard.push_operator(bin(BinaryOp::Mul)).unwrap();
        yard.push_operand(leaf("c"));
        yard.push_operator(bin(BinaryOp::Sub)).unwrap();
        yard.push_operand(leaf("d"));
        yard.reduce_scope().unwrap();
        assert_eq!(yard.finish().unwrap(), leaf("((a+(b*c))-d)"));
    }

    #[test]
    fn test_unary_binds_tighter_than_power() {
        let mut yard = ShuntingYard::new();
        yard.push_operator(Operator::Unary(UnaryOp::Neg)).unwrap();
        yard.push_operand(leaf("a"));
        yard.push_operator(bin(BinaryOp::Pow)).unwrap();
        yard.push_operand(leaf("2"));
        yard.reduce_scope().unwrap();
        assert_eq!(yard.finish().unwrap(), leaf("((-a)^2)"));
    }

    #[test]
    fn test_sentinel_blocks_outer_reduction() {
        let mut yard = ShuntingYard::new();
        yard.push_operand(leaf("a"));
        yard.push_operator(bin(BinaryOp::Mul)).unwrap();
        yard.within_sentinel(|yard| {
            yard.push_operand(leaf("b"));
            yard.push_operator(bin(BinaryOp::Add))?;
            yard.push_operand(leaf("c"));
            assert_eq!(yard.operator_depth(), 4);
            yard.reduce_scope()
        })
        .unwrap();
        assert_eq!(yard.operator_depth(), 2);
        yard.reduce_scope().unwrap();
        assert_eq!(yard.finish().unwrap(), leaf("(a*(b+c))"));
    }

    #[test]
    fn test_scope_cannot_pop_outer_operands() {
        let mut yard: ShuntingYard<Expr> = ShuntingYard::new();
        yard.push_operand(leaf("outer"));
        let err = yard
            .within_sentinel(|yard| yard.pop_operands(1))
            .unwrap_err();
        assert!(matches!(err, Error::StackUnderflow(_)));
        assert_eq!(yard.operand_count(), 1);
        assert!(yard.top_is_sentinel());
        assert_eq!(yard.operator_depth(), 1);
    }

    #[test]
    fn test_pop_operands_keeps_push_order() {
        let mut yard = ShuntingYard::new();
        let args = yard
            .within_sentinel(|yard| {
                for name in ["x", "y", "z"] {
                    yard.push_operand(leaf(name));
                }
                yard.pop_operands(3)
            })
            .unwrap();
        assert_eq!(args, [leaf("x"), leaf("y"), leaf("z")]);
    }

    #[test]
    fn test_error_path_still_pops_sentinel() {
        let mut yard: ShuntingYard<Expr> = ShuntingYard::new();
        let result: Result<()> = yard.within_sentinel(|_| Err(Error::EmptyResult));
        assert_eq!(result, Err(Error::EmptyResult));
        assert_eq!(yard.operator_depth(), 1);
    }

    #[test]
    fn test_dangling_operator_violates_scope() {
        let mut yard: ShuntingYard<Expr> = ShuntingYard::new();
        let result = yard.within_sentinel(|yard| {
            yard.push_operand(leaf("a"));
            yard.push_operator(bin(BinaryOp::Add))
        });
        assert!(matches!(result, Err(Error::StackInvariantViolation(_))));
    }

    #[test]
    fn test_underflow_on_missing_operand() {
        let mut yard: ShuntingYard<Expr> = ShuntingYard::new();
        yard.push_operand(leaf("a"));
        yard.push_operator(bin(BinaryOp::Add)).unwrap();
        assert!(matches!(yard.reduce_scope(), Err(Error::StackUnderflow(_))));
    }

    #[test]
    fn test_reducing_sentinel_is_an_invariant_violation() {
        let mut yard: ShuntingYard<Expr> = ShuntingYard::new();
        assert!(matches!(
            yard.pop_and_reduce(),
            Err(Error::StackInvariantViolation(_))
        ));
    }

    #[test]
    fn test_depth_limit_counts_reductions() {
        let mut yard = ShuntingYard::new().with_depth_limit(3);
        yard.push_operand(leaf("a"));
        for name in ["b", "c"] {
            yard.push_operator(bin(BinaryOp::Sub)).unwrap();
            yard.push_operand(leaf(name));
        }
        yard.push_operator(bin(BinaryOp::Sub)).unwrap();
        yard.push_operand(leaf("d"));
        assert_eq!(
            yard.reduce_scope(),
            Err(Error::DepthLimitExceeded { limit: 3 })
        );
    }

    #[test]
    fn test_reduce_call_depth() {
        let mut yard = ShuntingYard::new().with_depth_limit(2);
        yard.within_sentinel(|yard| {
            yard.push_operand(leaf("x"));
            yard.push_operand(leaf("y"));
            yard.reduce_call(2, |args| {
                let names: Vec<_> = args.into_iter().map(|arg| arg.0).collect();
                Expr(format!("f({})", names.join(",")))
            })
        })
        .unwrap();
        assert_eq!(yard.operand_count(), 1);

        yard.push_operator(Operator::Unary(UnaryOp::Neg)).unwrap();
        yard.within_sentinel(|yard| {
            yard.push_operand(leaf("z"));
            yard.reduce_call(1, |mut args| args.remove(0))
        })
        .unwrap();
        assert_eq!(
            yard.reduce_scope(),
            Err(Error::DepthLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_finish_empty() {
        let yard: ShuntingYard<Expr> = ShuntingYard::new();
        assert_eq!(yard.finish(), Err(Error::EmptyResult));
    }
}
