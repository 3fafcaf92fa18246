// 使用 mimalloc 作为全局内存分配器
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    rocketchat_hook::init_tracing();
    std::process::exit(rocketchat_hook::run_from_process());
}
