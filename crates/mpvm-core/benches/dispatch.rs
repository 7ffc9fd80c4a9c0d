use criterion::*;
use mpvm_core::bytecode::{Instruction, OpCode, Program};
use mpvm_core::{VirtualMachine, VmConfig};

/// i = 0; while i < n { i = i + 1 }
fn counting_loop(n: i64) -> Program {
    Program::new(
        vec![
            Instruction::with_operand(OpCode::LoadConst, 0),
            Instruction::with_operand(OpCode::StoreName, 0),
            Instruction::with_operand(OpCode::LoadName, 0),
            Instruction::with_operand(OpCode::LoadConst, 1),
            Instruction::new(OpCode::Add),
            Instruction::with_operand(OpCode::StoreName, 0),
            Instruction::with_operand(OpCode::LoadName, 0),
            Instruction::with_operand(OpCode::LoadConst, 2),
            Instruction::new(OpCode::CmpLt),
            Instruction::with_operand(OpCode::JumpIfTrue, 2),
            Instruction::new(OpCode::Halt),
        ],
        vec![0, 1, n],
        vec!["i".to_string()],
    )
}

fn dispatch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dispatch Throughput");
    for n in [1_000i64, 100_000] {
        let program = counting_loop(n);
        // 8 instructions per iteration plus setup and halt
        group.throughput(Throughput::Elements(n as u64 * 8 + 3));
        group.bench_with_input(format!("counting loop to {}", n), &program, |b, program| {
            b.iter(|| {
                let mut vm = VirtualMachine::new(VmConfig::new(), program);
                vm.run(&mut std::io::sink()).expect("run failed");
                black_box(vm.globals().get("i"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, dispatch_throughput);
criterion_main!(benches);
