use std::{
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
};

use log::debug;

use crate::{
    config::Config,
    io::{Random, StdRandom, StdStream, Stream},
    keywords::Locale,
    plist::PropLists,
    proc::{Proc, ProcKind, UserProc},
    turtle::{Canvas, NullCanvas, Turtle},
    typ::Value,
    Error,
};

/// Variable bindings.
///
/// Scoping is dynamic: a local binding is visible to the procedure that declared it and to
/// everything that procedure calls, until it returns. Each name has a stack of shadows, and each
/// procedure call has a frame recording which shadows it pushed.
#[derive(Debug, Default)]
struct Scope {
    // `None` is a variable that has been declared but never given a value.
    globals: BTreeMap<String, Option<Value>>,
    shadows: HashMap<String, Vec<Option<Value>>>,
    frames: Vec<Vec<String>>,
    buried: HashSet<String>,
}

impl Scope {
    fn lookup(&self, name: &str) -> Option<Value> {
        match self.shadows.get(name).and_then(|s| s.last()) {
            Some(v) => v.clone(),
            None => self.globals.get(name).cloned().flatten(),
        }
    }

    fn slot(&mut self, name: &str) -> &mut Option<Value> {
        match self.shadows.get_mut(name).and_then(|s| s.last_mut()) {
            Some(v) => v,
            None => self.globals.entry(name.to_owned()).or_default(),
        }
    }

    // Returns the innermost shadow of `name`, pushing one if the current frame hasn't already.
    fn declare(&mut self, name: &str) -> &mut Option<Value> {
        let Some(frame) = self.frames.last_mut() else {
            return self.globals.entry(name.to_owned()).or_default();
        };
        let stack = self.shadows.entry(name.to_owned()).or_default();
        if !frame.iter().any(|n| n == name) {
            frame.push(name.to_owned());
            stack.push(None);
        }
        // We just made sure there's at least one.
        let last = stack.len() - 1;
        &mut stack[last]
    }

    fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    fn pop_frame(&mut self) {
        for name in self.frames.pop().into_iter().flatten() {
            if let Some(stack) = self.shadows.get_mut(&name) {
                stack.pop();
                if stack.is_empty() {
                    self.shadows.remove(&name);
                }
            }
        }
    }
}

/// An interpreter instance.
///
/// Everything a program can see or change lives in here: variables, procedures, property lists
/// and the turtle. The outside world is reached only through the stream, canvas and random
/// collaborators.
pub struct Env {
    config: Config,
    scope: Scope,
    procs: HashMap<String, Rc<dyn Proc>>,
    buried_procs: HashSet<String>,
    pub(crate) plists: PropLists,
    turtle: Turtle,
    stream: Box<dyn Stream>,
    canvas: Box<dyn Canvas>,
    random: Box<dyn Random>,
    pub(crate) repcounts: Vec<f64>,
    pub(crate) template_args: Vec<Vec<Value>>,
    pub(crate) test: bool,
    gensym: u64,
}

impl Default for Env {
    fn default() -> Self {
        Env::new(Config::default())
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("config", &self.config)
            .field("scope", &self.scope)
            .field("procs", &self.procs.len())
            .field("turtle", &self.turtle)
            .finish_non_exhaustive()
    }
}

impl Env {
    pub fn new(config: Config) -> Env {
        let mut ret = Env {
            scope: Scope::default(),
            procs: HashMap::new(),
            buried_procs: HashSet::new(),
            plists: PropLists::default(),
            turtle: Turtle::new(config.half_width, config.half_height, config.turtle_mode),
            stream: Box::new(StdStream),
            canvas: Box::new(NullCanvas),
            random: Box::new(StdRandom::new(config.seed)),
            repcounts: Vec::new(),
            template_args: Vec::new(),
            test: false,
            gensym: 0,
            config,
        };
        crate::builtins::install(&mut ret);
        ret
    }

    pub fn with_stream(mut self, stream: impl Stream + 'static) -> Env {
        self.stream = Box::new(stream);
        self
    }

    pub fn with_canvas(mut self, canvas: impl Canvas + 'static) -> Env {
        self.canvas = Box::new(canvas);
        self
    }

    pub fn with_random(mut self, random: impl Random + 'static) -> Env {
        self.random = Box::new(random);
        self
    }

    /// Forgets everything the program did, going back to the state `new` started in.
    ///
    /// The collaborators stay attached, but the canvas is cleared.
    pub fn reset(&mut self) {
        debug!("resetting interpreter");
        self.scope = Scope::default();
        self.procs.clear();
        self.buried_procs.clear();
        self.plists = PropLists::default();
        let c = &self.config;
        self.turtle = Turtle::new(c.half_width, c.half_height, c.turtle_mode);
        self.canvas.clear();
        if let Some(seed) = c.seed {
            self.random.reseed(seed);
        }
        self.repcounts.clear();
        self.template_args.clear();
        self.test = false;
        self.gensym = 0;
        crate::builtins::install(self);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    /// The name of a primitive in the current locale, upper-cased for messages.
    pub fn display(&self, id: &str) -> String {
        self.locale().display(id)
    }

    /// Registers a primitive under each of its names in the current locale.
    pub fn add_primitive(&mut self, proc: Rc<dyn Proc>) {
        let aliases = self.locale().aliases(proc.name());
        if aliases.is_empty() {
            debug!("no {:?} name for primitive {}", self.locale(), proc.name());
            self.procs.insert(proc.name().to_owned(), proc);
            return;
        }
        for alias in aliases {
            self.procs.insert(alias.to_lowercase(), proc.clone());
        }
    }

    /// Runs `f` inside a new procedure frame. Local variables declared by `f` disappear when it
    /// returns, however it returns.
    pub fn scoped<U>(&mut self, f: impl FnOnce(&mut Env) -> U) -> U {
        self.scope.push_frame();
        let res = f(self);
        self.scope.pop_frame();
        res
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.scope.lookup(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Sets the innermost visible variable called `name`, creating a global if there isn't one.
    pub fn assign(&mut self, name: &str, val: Value) {
        *self.scope.slot(name) = Some(val);
    }

    /// Declares a local variable without giving it a value. At top level this is a global.
    pub fn declare_local(&mut self, name: &str) {
        self.scope.declare(name);
    }

    pub fn local_make(&mut self, name: &str, val: Value) {
        *self.scope.declare(name) = Some(val);
    }

    pub fn declare_global(&mut self, name: &str) {
        self.scope.globals.entry(name.to_owned()).or_default();
    }

    /// Whether the unlock variable holds a true value.
    fn unlocked(&self) -> bool {
        self.lookup(self.locale().unlock_var())
            .is_some_and(|v| v.as_bool() == Ok(true))
    }

    fn unlock_name(&self) -> String {
        self.locale().unlock_var().to_uppercase()
    }

    pub fn procedure(&self, name: &str) -> Option<Rc<dyn Proc>> {
        self.procs.get(name).cloned()
    }

    pub fn define(&mut self, proc: Rc<UserProc>) -> Result<(), Error> {
        match self.procs.get(&proc.name).map(|p| p.kind()) {
            Some(ProcKind::Special) => return Err(Error::CantRedefine(proc.name.to_uppercase())),
            Some(ProcKind::Primitive) if !self.unlocked() => {
                return Err(Error::OverwritePrimitive(self.unlock_name()))
            }
            _ => {}
        }
        debug!("defining {} with inputs {:?}", proc.name, proc.params);
        self.procs.insert(proc.name.clone(), proc);
        Ok(())
    }

    /// Makes `new` another name for the procedure currently called `old`.
    pub fn copy_def(&mut self, new: &str, old: &str) -> Result<(), Error> {
        let proc = self
            .procedure(old)
            .ok_or_else(|| Error::UnknownProc(old.to_uppercase()))?;
        match self.procs.get(new).map(|p| p.kind()) {
            Some(ProcKind::Special) => return Err(Error::OverwriteSpecial(new.to_uppercase())),
            Some(ProcKind::Primitive) if !self.unlocked() => {
                return Err(Error::OverwritePrimitive(self.unlock_name()))
            }
            _ => {}
        }
        debug!("copying {old} to {new}");
        self.procs.insert(new.to_owned(), proc);
        Ok(())
    }

    pub fn erase_proc(&mut self, name: &str) -> Result<(), Error> {
        match self.procs.get(name).map(|p| p.kind()) {
            None => return Err(Error::UnknownProc(name.to_uppercase())),
            Some(ProcKind::Special) => return Err(Error::EraseSpecial(name.to_uppercase())),
            Some(ProcKind::Primitive) if !self.unlocked() => {
                return Err(Error::ErasePrimitive(self.unlock_name()))
            }
            _ => {}
        }
        debug!("erasing procedure {name}");
        self.procs.remove(name);
        self.buried_procs.remove(name);
        Ok(())
    }

    /// The source text of a user-defined procedure.
    pub fn proc_text(&self, name: &str) -> Result<String, Error> {
        let proc = self
            .procedure(name)
            .ok_or_else(|| Error::UnknownProc(name.to_uppercase()))?;
        proc.definition()
            .map(str::to_owned)
            .ok_or_else(|| Error::CantShow(name.to_uppercase()))
    }

    /// Names of the user-defined procedures that aren't buried, in order.
    pub fn user_procs(&self) -> Vec<String> {
        let mut ret: Vec<String> = self
            .procs
            .iter()
            .filter(|(name, p)| p.kind() == ProcKind::User && !self.buried_procs.contains(*name))
            .map(|(name, _)| name.clone())
            .collect();
        ret.sort();
        ret
    }

    /// Names of the global variables that aren't buried, in order.
    pub fn global_names(&self) -> Vec<String> {
        self.scope
            .globals
            .keys()
            .filter(|k| !self.scope.buried.contains(*k))
            .cloned()
            .collect()
    }

    pub fn erase_global(&mut self, name: &str) {
        debug!("erasing variable {name}");
        self.scope.globals.remove(name);
        self.scope.buried.remove(name);
    }

    pub fn bury_proc(&mut self, name: &str, buried: bool) {
        if buried {
            self.buried_procs.insert(name.to_owned());
        } else {
            self.buried_procs.remove(name);
        }
    }

    pub fn bury_global(&mut self, name: &str, buried: bool) {
        if buried {
            self.scope.buried.insert(name.to_owned());
        } else {
            self.scope.buried.remove(name);
        }
    }

    pub fn proc_buried(&self, name: &str) -> bool {
        self.buried_procs.contains(name)
    }

    pub fn global_buried(&self, name: &str) -> bool {
        self.scope.buried.contains(name)
    }

    pub fn unbury_all(&mut self) {
        self.buried_procs.clear();
        self.scope.buried.clear();
        self.plists.unbury_all();
    }

    pub fn gensym(&mut self) -> String {
        self.gensym += 1;
        format!("g{}", self.gensym)
    }

    pub fn turtle(&self) -> &Turtle {
        &self.turtle
    }

    /// Runs a turtle command, letting the canvas watch.
    pub fn turtle_do<U>(&mut self, f: impl FnOnce(&mut Turtle, &mut dyn Canvas) -> U) -> U {
        f(&mut self.turtle, &mut *self.canvas)
    }

    pub fn write(&mut self, text: &str) {
        self.stream.write(text);
    }

    pub fn read(&mut self, prompt: Option<&str>) -> Option<String> {
        self.stream.read(prompt)
    }

    pub fn clear_text(&mut self) {
        self.stream.clear();
    }

    pub fn random(&mut self) -> f64 {
        self.random.next_f64()
    }

    pub fn reseed(&mut self, seed: u64) {
        debug!("reseeding with {seed}");
        self.random.reseed(seed);
    }
}
