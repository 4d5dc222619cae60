use std::thread;

/// Address used when neither `ARGS` nor the configuration names one.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

const BIND_FLAG: &str = "--bind-to";

/// State set up by the scheduling bootstrap requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scheduler {
    nprocs: Option<usize>,
    bind_addr: Option<String>,
    head_ready: bool,
    yields: u64,
    parallel_inits: u32,
    bind_addr_inits: u32,
    head_sched_inits: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the worker count: the configured one, else the machine's
    /// available parallelism.
    pub fn init_parallel(&mut self, configured: Option<usize>) -> usize {
        let nprocs = configured
            .filter(|n| *n > 0)
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, usize::from));
        self.nprocs = Some(nprocs);
        self.parallel_inits += 1;
        nprocs
    }

    /// Records the address following `--bind-to` in `args`, else the
    /// configured one, else [`DEFAULT_BIND_ADDR`].
    pub fn init_bind_addr(&mut self, args: &[String], configured: Option<&str>) -> String {
        let mut from_args = None;
        for (i, arg) in args.iter().enumerate() {
            if arg == BIND_FLAG {
                from_args = args.get(i + 1).cloned();
                break;
            }
            if let Some(addr) = arg.strip_prefix("--bind-to=") {
                from_args = Some(addr.to_string());
                break;
            }
        }

        let addr = from_args
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        self.bind_addr = Some(addr.clone());
        self.bind_addr_inits += 1;
        addr
    }

    pub fn init_head_sched(&mut self) {
        self.head_ready = true;
        self.head_sched_inits += 1;
    }

    pub fn record_yield(&mut self) -> u64 {
        self.yields += 1;
        self.yields
    }

    pub fn nprocs(&self) -> Option<usize> {
        self.nprocs
    }

    pub fn bind_addr(&self) -> Option<&str> {
        self.bind_addr.as_deref()
    }

    pub fn head_ready(&self) -> bool {
        self.head_ready
    }

    pub fn yields(&self) -> u64 {
        self.yields
    }

    pub fn parallel_inits(&self) -> u32 {
        self.parallel_inits
    }

    pub fn bind_addr_inits(&self) -> u32 {
        self.bind_addr_inits
    }

    pub fn head_sched_inits(&self) -> u32 {
        self.head_sched_inits
    }
}
