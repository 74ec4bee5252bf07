//! The synthesis engine.
//!
//! Statements are lowered into gate buffers. Each call, uncall and
//! expression opens a new buffer; closing it appends the buffered gates to
//! the enclosing buffer either in stored order or reversed.

mod access;
mod expression;
mod statement;

use rustc_hash::FxHashMap;
use syrec_ir::{CallSite, Circuit, Gate, GateAnnotation, InlineInfo, Line, LineId};
use syrec_lang::{Module, Number, NumberContext, Program, Signal, SignalKind};
use tracing::debug;

use crate::allocator::LineAllocator;
use crate::controls::ControlStack;
use crate::error::{SynthesisError, SynthesisResult};
use crate::primitives::GateSink;
use crate::settings::{SynthesisMode, SynthesisSettings};

type Buffer = Vec<(Gate, GateAnnotation)>;

/// Signal bindings and loop variables of the module being lowered.
struct Invocation<'p> {
    module: &'p Module,
    signals: FxHashMap<&'p str, Vec<LineId>>,
    loop_vars: Vec<(&'p str, u64)>,
}

impl<'p> Invocation<'p> {
    fn new(module: &'p Module) -> Self {
        Self {
            module,
            signals: FxHashMap::default(),
            loop_vars: Vec::new(),
        }
    }
}

impl NumberContext for Invocation<'_> {
    fn signal_width(&self, name: &str) -> Option<u64> {
        self.module.find_signal(name).map(|s| u64::from(s.width))
    }

    fn loop_variable(&self, name: &str) -> Option<u64> {
        self.loop_vars
            .iter()
            .rev()
            .find(|(var, _)| *var == name)
            .map(|(_, value)| *value)
    }
}

/// Lowers one program into one circuit.
pub(crate) struct Synthesizer<'p> {
    program: &'p Program,
    settings: &'p SynthesisSettings,
    mode: SynthesisMode,
    main: &'p Module,
    circuit: Circuit,
    allocator: LineAllocator,
    controls: ControlStack,
    root: Buffer,
    frames: Vec<Buffer>,
    invocation: Invocation<'p>,
    call_stack: Vec<CallSite>,
    /// Number of enclosing uncalls.
    reversed_depth: usize,
    statement_line: Option<u32>,
    iterations: u64,
    invocations: usize,
    /// Reads per line in the expression being lowered.
    line_uses: FxHashMap<LineId, usize>,
}

impl<'p> Synthesizer<'p> {
    pub(crate) fn new(
        program: &'p Program,
        mode: SynthesisMode,
        settings: &'p SynthesisSettings,
        main: &'p Module,
    ) -> Self {
        Self {
            program,
            settings,
            mode,
            main,
            circuit: Circuit::new(main.name.clone()),
            allocator: LineAllocator::new(mode),
            controls: ControlStack::new(),
            root: Vec::new(),
            frames: Vec::new(),
            invocation: Invocation::new(main),
            call_stack: Vec::new(),
            reversed_depth: 0,
            statement_line: None,
            iterations: 0,
            invocations: 0,
            line_uses: FxHashMap::default(),
        }
    }

    /// Synthesize the main module and return the finished circuit.
    pub(crate) fn run(mut self) -> SynthesisResult<Circuit> {
        let main = self.main;
        for signal in main.signals() {
            let lines = self.bind_variable(signal)?;
            self.invocation.signals.insert(signal.name.as_str(), lines);
        }
        debug!(
            "Bound {} signals of '{}' to {} lines",
            self.invocation.signals.len(),
            main.name,
            self.circuit.num_lines()
        );

        self.lower_statements(&main.statements)?;

        self.allocator.finish(&mut self.circuit)?;
        for (gate, annotation) in std::mem::take(&mut self.root) {
            self.circuit.append_annotated(gate, annotation)?;
        }
        Ok(self.circuit)
    }

    /// Allocate the lines of a main-module signal.
    fn bind_variable(&mut self, signal: &Signal) -> SynthesisResult<Vec<LineId>> {
        if signal.width == 0 {
            return Err(SynthesisError::ZeroWidth(format!("signal '{}'", signal.name)));
        }
        let mut lines = Vec::new();
        for index in 0..signal.num_lines() {
            let label = bit_label(signal, index);
            let line = Line::new(label.clone()).with_register(&signal.name, index as u32);
            let line = match signal.kind {
                SignalKind::In => line.with_input(label).with_garbage(true),
                SignalKind::Out => Line {
                    constant: Some(false),
                    ..line.with_output(label)
                },
                SignalKind::Inout | SignalKind::State => {
                    line.with_input(label.clone()).with_output(label)
                }
                SignalKind::Wire => Line {
                    constant: Some(false),
                    ..line.with_garbage(true)
                },
            };
            lines.push(self.allocator.add_variable_line(&mut self.circuit, line));
        }
        Ok(lines)
    }

    /// Allocate fresh lines for a callee-local signal.
    fn bind_local(&mut self, module: &str, signal: &Signal) -> SynthesisResult<Vec<LineId>> {
        if signal.width == 0 {
            return Err(SynthesisError::ZeroWidth(format!("signal '{}'", signal.name)));
        }
        let mut lines = Vec::new();
        for index in 0..signal.num_lines() {
            let user_label = bit_label(signal, index);
            let label = format!("{module}@{}.{user_label}", self.invocations);
            let mut line = Line::constant(label, false);
            if self.settings.generate_inline_debug_information {
                line = line.with_inline(InlineInfo {
                    user_label,
                    call_stack: self.call_stack.clone(),
                });
            }
            lines.push(self.allocator.add_local_line(&mut self.circuit, line));
        }
        Ok(lines)
    }

    /// Lower a call or uncall of `name` with caller signals `arguments`.
    fn lower_call(&mut self, name: &str, arguments: &[String], uncall: bool) -> SynthesisResult<()> {
        let program = self.program;
        let callee = program
            .find_module(name)
            .ok_or_else(|| SynthesisError::UnknownModule(name.to_string()))?;
        if callee.name == self.main.name || self.call_stack.iter().any(|site| site.module == name) {
            return Err(SynthesisError::RecursiveCall(name.to_string()));
        }
        if arguments.len() != callee.parameters.len() {
            return Err(SynthesisError::ArgumentCount {
                module: name.to_string(),
                expected: callee.parameters.len(),
                found: arguments.len(),
            });
        }

        let mut frame = Invocation::new(callee);
        for (parameter, argument) in callee.parameters.iter().zip(arguments) {
            let lines = self
                .invocation
                .signals
                .get(argument.as_str())
                .cloned()
                .ok_or_else(|| SynthesisError::UnknownSignal(argument.clone()))?;
            if lines.len() as u64 != parameter.num_lines() {
                return Err(SynthesisError::WidthMismatch {
                    context: format!("argument '{argument}' of call to '{name}'"),
                    expected: parameter.num_lines() as usize,
                    found: lines.len(),
                });
            }
            frame.signals.insert(parameter.name.as_str(), lines);
        }

        self.call_stack.push(CallSite {
            module: callee.name.clone(),
            source_line: self.statement_line,
            uncall,
        });
        self.invocations += 1;
        for local in &callee.locals {
            let lines = self.bind_local(&callee.name, local)?;
            frame.signals.insert(local.name.as_str(), lines);
        }
        debug!(
            "{} '{}' at depth {}",
            if uncall { "Uncalling" } else { "Calling" },
            name,
            self.call_stack.len()
        );

        if uncall {
            self.reversed_depth += 1;
        }
        let caller = std::mem::replace(&mut self.invocation, frame);
        self.frames.push(Vec::new());
        let result = self.lower_statements(&callee.statements);
        let body = self.frames.pop().unwrap_or_default();
        self.invocation = caller;
        if uncall {
            self.reversed_depth -= 1;
        }
        self.call_stack.pop();
        result?;

        self.append_buffer(body, uncall);
        Ok(())
    }

    /// Append a closed buffer to the current one, reversed for uncomputation.
    fn append_buffer(&mut self, buffer: Buffer, reverse: bool) {
        let frame = self.frames.last_mut().unwrap_or(&mut self.root);
        if reverse {
            frame.extend(buffer.into_iter().rev());
        } else {
            frame.extend(buffer);
        }
    }

    /// Whether temporaries must be uncomputed and released.
    ///
    /// Bodies that will be replayed in reverse always restore them.
    fn restores_temporaries(&self) -> bool {
        self.mode.reuses_lines() || self.reversed_depth > 0
    }

    fn evaluate_number(&self, number: &Number) -> SynthesisResult<u64> {
        number
            .evaluate(&self.invocation)
            .map_err(|e| SynthesisError::Number(e.to_string()))
    }
}

impl GateSink for Synthesizer<'_> {
    fn controls(&mut self) -> &mut ControlStack {
        &mut self.controls
    }

    fn emit_uncontrolled(&mut self, gate: Gate) -> SynthesisResult<()> {
        let annotation = GateAnnotation {
            statement_line: self.statement_line,
        };
        let frame = self.frames.last_mut().unwrap_or(&mut self.root);
        frame.push((gate, annotation));
        Ok(())
    }
}

/// `a.3` for scalars, `m[1][0].3` for array elements.
fn bit_label(signal: &Signal, index: u64) -> String {
    let width = u64::from(signal.width);
    let bit = index % width;
    let mut element = index / width;
    if signal.dimensions.is_empty() {
        return format!("{}.{bit}", signal.name);
    }
    let mut indices = Vec::with_capacity(signal.dimensions.len());
    for &size in signal.dimensions.iter().rev() {
        let size = u64::from(size);
        indices.push(element % size);
        element /= size;
    }
    let subscripts: String = indices.iter().rev().map(|i| format!("[{i}]")).collect();
    format!("{}{subscripts}.{bit}", signal.name)
}
