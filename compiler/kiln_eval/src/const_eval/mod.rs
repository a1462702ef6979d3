//! Reference expression evaluator.
//!
//! Executes the subset of the IR that is meaningful without a runtime:
//! literals, variable reads, built-in operators, constructors of
//! compile-time classes, property getters on the objects it created, and
//! `vararg` arrays. Objects live in the evaluator's own heap and are handed
//! out as [`Value::Complex`] handles, so the same evaluator must serve a
//! whole function (it is created per file by the lowering pass).

mod intrinsics;

use kiln_ir::{Call, ConstructorCall, Expr, ExprKind, FunctionKind, FunctionTable, Name, Type};
use kiln_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::value::ObjectId;
use crate::{ExecutionFailure, ExpressionEvaluator, FrameStack, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
enum HeapObject {
    Instance { fields: FxHashMap<Name, Value> },
    Array(Vec<Value>),
}

pub struct ConstEvaluator<'a> {
    functions: &'a FunctionTable,
    heap: Vec<HeapObject>,
}

type Operands = SmallVec<[Value; 4]>;

impl<'a> ConstEvaluator<'a> {
    pub fn new(functions: &'a FunctionTable) -> Self {
        ConstEvaluator {
            functions,
            heap: Vec::new(),
        }
    }

    /// Number of objects and arrays allocated so far.
    pub fn heap_size(&self) -> usize {
        self.heap.len()
    }

    fn alloc(&mut self, object: HeapObject, ty: &Type) -> Value {
        let handle = ObjectId::from_raw(u32::try_from(self.heap.len()).unwrap_or(u32::MAX));
        self.heap.push(object);
        Value::Complex {
            ty: ty.clone(),
            handle,
        }
    }

    fn object(&self, value: &Value) -> Option<&HeapObject> {
        match value {
            Value::Complex { handle, .. } => self.heap.get(handle.raw() as usize),
            Value::Primitive(_) => None,
        }
    }

    fn eval(&mut self, expr: &Expr, frames: &FrameStack) -> Result<Value, ExecutionFailure> {
        ensure_sufficient_stack(|| self.eval_inner(expr, frames))
    }

    fn eval_inner(&mut self, expr: &Expr, frames: &FrameStack) -> Result<Value, ExecutionFailure> {
        match &expr.kind {
            ExprKind::Const(c) => Ok(Value::Primitive(c.clone())),
            ExprKind::GetValue(local) => frames
                .value_of(local.id)
                .cloned()
                .ok_or(ExecutionFailure::UnknownValue(local.id)),
            ExprKind::Call(call) => self.eval_call(call, frames),
            ExprKind::ConstructorCall(call) => self.eval_constructor(call, &expr.ty, frames),
            ExprKind::Vararg(elements) => {
                let values = elements
                    .iter()
                    .map(|e| self.eval(e, frames))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.alloc(HeapObject::Array(values), &expr.ty))
            }
            _ => Err(ExecutionFailure::Unsupported(expr.kind_name())),
        }
    }

    fn eval_call(&mut self, call: &Call, frames: &FrameStack) -> Result<Value, ExecutionFailure> {
        let info = self
            .functions
            .get(call.callee)
            .ok_or(ExecutionFailure::UnknownCallee(call.callee))?;

        let mut operands = Operands::new();
        for receiver in [&call.dispatch_receiver, &call.extension_receiver]
            .into_iter()
            .flatten()
        {
            operands.push(self.eval(receiver, frames)?);
        }
        for arg in &call.args {
            operands.push(self.eval(arg, frames)?);
        }

        match &info.kind {
            FunctionKind::Intrinsic(op) => intrinsics::apply(*op, &operands, |v| self.array(v)),
            FunctionKind::Getter { field } => {
                let receiver = operands
                    .first()
                    .ok_or(ExecutionFailure::TypeMismatch("getter without receiver"))?;
                match self.object(receiver) {
                    Some(HeapObject::Instance { fields, .. }) => fields
                        .get(field)
                        .cloned()
                        .ok_or(ExecutionFailure::MissingField(*field)),
                    _ => Err(ExecutionFailure::TypeMismatch("getter on a non-object")),
                }
            }
            FunctionKind::Constructor { .. } | FunctionKind::Regular => {
                Err(ExecutionFailure::NoImplementation(call.callee))
            }
        }
    }

    fn eval_constructor(
        &mut self,
        call: &ConstructorCall,
        ty: &Type,
        frames: &FrameStack,
    ) -> Result<Value, ExecutionFailure> {
        let info = self
            .functions
            .get(call.constructor)
            .ok_or(ExecutionFailure::UnknownCallee(call.constructor))?;
        let FunctionKind::Constructor { fields, .. } = &info.kind else {
            return Err(ExecutionFailure::TypeMismatch("constructor call of a non-constructor"));
        };
        if fields.len() != call.args.len() {
            return Err(ExecutionFailure::TypeMismatch("constructor arity"));
        }

        let mut values = FxHashMap::default();
        for (field, arg) in fields.iter().zip(&call.args) {
            values.insert(*field, self.eval(arg, frames)?);
        }
        Ok(self.alloc(HeapObject::Instance { fields: values }, ty))
    }

    fn array(&self, value: &Value) -> Option<&[Value]> {
        match self.object(value) {
            Some(HeapObject::Array(elements)) => Some(elements),
            _ => None,
        }
    }
}

impl ExpressionEvaluator for ConstEvaluator<'_> {
    fn interpret(&mut self, expr: &Expr, frames: &FrameStack) -> Result<Value, ExecutionFailure> {
        self.eval(expr, frames)
    }
}
